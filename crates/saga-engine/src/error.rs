//! Error types for the engine.

use saga_core::{ChapterId, ScriptError};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to the caller.
///
/// Everything else the engine encounters is logged and degrades to staying
/// on the current slide.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The script has no chapter with this id.
    #[error("unknown chapter: {0}")]
    UnknownChapter(ChapterId),

    /// The chapter exists but has no slides to show.
    #[error("chapter '{0}' has no slides")]
    EmptyChapter(ChapterId),

    /// Loading the script failed.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Error returned by a hook in place of completing normally.
///
/// A failing hook is logged and treated as if it had not handled the
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Create a hook error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
