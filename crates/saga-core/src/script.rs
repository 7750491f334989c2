//! The chapter book a game ships with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chapter::Chapter;
use crate::error::{ScriptError, ScriptResult};
use crate::id::ChapterId;

/// Every chapter of a game plus the chapter unlocked from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Chapter that is always unlocked.
    pub first_chapter: ChapterId,
    /// All chapters.
    pub chapters: Vec<Chapter>,
}

impl Script {
    /// Create a script with no chapters.
    pub fn new(first_chapter: impl Into<ChapterId>) -> Self {
        Self {
            first_chapter: first_chapter.into(),
            chapters: Vec::new(),
        }
    }

    /// Append a chapter.
    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub fn from_path(path: &Path) -> ScriptResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize the script as pretty JSON.
    pub fn to_json(&self) -> ScriptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a chapter.
    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id.as_str() == id)
    }

    /// Look up a chapter, failing with [`ScriptError::UnknownChapter`].
    pub fn require_chapter(&self, id: &ChapterId) -> ScriptResult<&Chapter> {
        self.chapter(id.as_str())
            .ok_or_else(|| ScriptError::UnknownChapter(id.clone()))
    }

    /// Whether a chapter exists.
    pub fn has_chapter(&self, id: &str) -> bool {
        self.chapter(id).is_some()
    }
}
