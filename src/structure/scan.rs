use crate::error::{ExtractError, Result};
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LanguageSpec {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Honor `.gitignore`, `.ignore` and git excludes.
    pub respect_ignore: bool,
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl ScanOptions {
    pub fn new(respect_ignore: bool, extensions: Vec<String>) -> Self {
        Self {
            respect_ignore,
            extensions,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            respect_ignore: false,
            extensions: vec!["py".to_string()],
        }
    }
}

static LANGUAGE_SPECS: &[LanguageSpec] = &[LanguageSpec {
    name: "python",
    extensions: &["py"],
}];

pub fn language_specs() -> &'static [LanguageSpec] {
    LANGUAGE_SPECS
}

/// Every matching file under `root`, sorted by `/`-separated relative path so
/// that runs are reproducible across platforms.
pub fn scan_tree(root: &Path, options: &ScanOptions) -> Result<Vec<ScannedFile>> {
    let mut builder = WalkBuilder::new(root);
    if options.respect_ignore {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    } else {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_ignored_entry(entry))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ExtractError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !is_source_entry(&entry) || !has_extension(path, &options.extensions) {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        files.push(ScannedFile {
            rel_path: crate::util::normalize_path(rel),
            abs_path: path.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

/// Regular files, plus symlinks that do not point at a directory. Linked
/// directories are never descended into; a dangling link is kept so that
/// reading it fails loudly.
fn is_source_entry(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => !entry.path().is_dir(),
        _ => false,
    }
}

fn is_ignored_entry(entry: &ignore::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name() == OsStr::new(".git")
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    extensions.iter().any(|candidate| candidate == ext)
}
