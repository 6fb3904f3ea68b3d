use std::path::PathBuf;
use thiserror::Error;

/// Fatal extraction failures. Syntax errors are not here: a file that fails
/// to parse is skipped and reported through `FileOutcome::SyntaxError`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", .path.display())]
    Decode { path: PathBuf },
    #[error("parser setup: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
