use serde::{Deserialize, Serialize};

use crate::id::{ChapterId, HookId};
use crate::slide::Slide;

/// An authored sequence of slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique chapter identifier.
    pub id: ChapterId,
    /// Human-readable title for chapter-select surfaces.
    #[serde(default)]
    pub title: String,
    /// Slides in order.
    pub slides: Vec<Slide>,
    /// Hook invoked when the chapter finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_finish: Option<HookId>,
}

impl Chapter {
    /// Create an empty chapter.
    pub fn new(id: impl Into<ChapterId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            slides: Vec::new(),
            on_finish: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a slide.
    pub fn with_slide(mut self, slide: Slide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Set the finish hook.
    pub fn with_on_finish(mut self, hook: impl Into<HookId>) -> Self {
        self.on_finish = Some(hook.into());
        self
    }

    /// Get a slide by index.
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Find the index of the slide with the given id (linear search).
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|slide| slide.has_id(id))
    }

    /// Whether `index` is the final slide.
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.slides.len()
    }

    /// Display name: the title, or the id when untitled.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}
