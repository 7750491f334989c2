//! Runtime state of one chapter traversal.

use std::collections::{BTreeSet, HashSet};

use saga_core::{ChapterId, CustomerStage, SideSlot};

/// Identifies one slide of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlideKey {
    /// The chapter.
    pub chapter_id: ChapterId,
    /// Index of the slide in the chapter.
    pub slide_index: usize,
}

/// The side-path currently open over a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SidePathCursor {
    pub slot: SideSlot,
    pub quest_step: usize,
}

/// State local to the current visit of a slide. Cleared whenever the slide
/// index changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SlideLocal {
    pub side_path: Option<SidePathCursor>,
    pub choice: Option<usize>,
    pub quiz_disabled: BTreeSet<usize>,
    pub quiz_solved: bool,
    pub customer_stage: CustomerStage,
}

/// Where the player is in a chapter and what they have done there.
///
/// A fresh state is created every time a chapter starts; nothing carries
/// over from a previous traversal. Visits and reveals are keyed by slide, so
/// visiting a side-path on one slide never satisfies a gate on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    pub(crate) chapter_id: ChapterId,
    pub(crate) slide_index: usize,
    visited: HashSet<(SlideKey, SideSlot)>,
    revealed: HashSet<(SlideKey, usize)>,
    completed_quests: HashSet<SlideKey>,
    pub(crate) local: SlideLocal,
}

impl EngineState {
    /// A fresh traversal positioned on the first slide of a chapter.
    pub fn new(chapter_id: impl Into<ChapterId>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            slide_index: 0,
            visited: HashSet::new(),
            revealed: HashSet::new(),
            completed_quests: HashSet::new(),
            local: SlideLocal::default(),
        }
    }

    /// The chapter being traversed.
    pub fn chapter_id(&self) -> &ChapterId {
        &self.chapter_id
    }

    /// Index of the current slide.
    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    /// Key of the current slide.
    pub fn key(&self) -> SlideKey {
        SlideKey {
            chapter_id: self.chapter_id.clone(),
            slide_index: self.slide_index,
        }
    }

    /// Whether the side-path has been visited on the current slide.
    pub fn has_visited(&self, slot: SideSlot) -> bool {
        self.visited.contains(&(self.key(), slot))
    }

    /// Whether a reveal step has been used on the current slide.
    pub fn is_revealed(&self, step: usize) -> bool {
        self.revealed.contains(&(self.key(), step))
    }

    /// Whether the current slide's quest has been completed.
    pub fn quest_completed(&self) -> bool {
        self.completed_quests.contains(&self.key())
    }

    /// The open side-path, if any.
    pub fn side_path(&self) -> Option<SideSlot> {
        self.local.side_path.map(|cursor| cursor.slot)
    }

    /// Current quest step, when the quest side-path is open.
    pub fn quest_step(&self) -> Option<usize> {
        self.local
            .side_path
            .filter(|cursor| cursor.slot == SideSlot::Quest)
            .map(|cursor| cursor.quest_step)
    }

    /// The choice option picked on this visit.
    pub fn chosen(&self) -> Option<usize> {
        self.local.choice
    }

    /// Whether a quiz option has been disabled.
    pub fn quiz_option_disabled(&self, index: usize) -> bool {
        self.local.quiz_solved || self.local.quiz_disabled.contains(&index)
    }

    /// Whether the quiz on this slide has been answered correctly.
    pub fn quiz_solved(&self) -> bool {
        self.local.quiz_solved
    }

    /// Stage of the customer flow on this slide.
    pub fn customer_stage(&self) -> CustomerStage {
        self.local.customer_stage
    }

    pub(crate) fn visit(&mut self, slot: SideSlot) -> bool {
        let key = self.key();
        self.visited.insert((key, slot))
    }

    pub(crate) fn reveal(&mut self, step: usize) -> bool {
        let key = self.key();
        self.revealed.insert((key, step))
    }

    pub(crate) fn complete_quest(&mut self) -> bool {
        let key = self.key();
        self.completed_quests.insert(key)
    }

    pub(crate) fn move_to(&mut self, index: usize) {
        self.slide_index = index;
        self.local = SlideLocal::default();
    }
}
