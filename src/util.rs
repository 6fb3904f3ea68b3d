use crate::error::{ExtractError, Result};
use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path};

/// Reads a source file as UTF-8. I/O failures and invalid encodings are both
/// fatal for a run, so they come back as distinct `ExtractError`s.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| ExtractError::Decode {
        path: path.to_path_buf(),
    })
}

/// Newline-delimited line count: empty text is 0 and an unterminated last
/// line still counts.
pub fn count_lines(source: &str) -> u64 {
    source.lines().count() as u64
}

/// Universal newlines: `\r\n` and a lone `\r` both become `\n`.
pub fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if !source.contains('\r') {
        return Cow::Borrowed(source);
    }
    Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
}

pub fn normalize_path(path: &Path) -> String {
    let mut parts = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            _ => {}
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
