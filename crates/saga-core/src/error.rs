use std::path::PathBuf;

use crate::id::ChapterId;

/// Alias for `Result<T, ScriptError>`.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors that can occur when loading or querying a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("cannot read script {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The script JSON is malformed.
    #[error("malformed script: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested chapter does not exist in the script.
    #[error("chapter not found: {0}")]
    UnknownChapter(ChapterId),
}
