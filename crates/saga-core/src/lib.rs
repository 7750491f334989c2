//! Script model for Saga: chapters, slides, grants, and quests.
//!
//! A [`Script`] is immutable, data-only narrative content shared by every
//! player. The engine only inspects the structural fields of a [`Slide`]
//! (its kind, options, gates, grants and hook names); presentation fields
//! travel through untouched as opaque [`Payload`] maps. Scripts can be built
//! programmatically or deserialized from JSON.

/// Chapters: ordered lists of slides.
pub mod chapter;
/// Error types used throughout the crate.
pub mod error;
/// Item and currency grants, and crafting recipes.
pub mod grant;
/// Identifier newtypes and side-path slots.
pub mod id;
/// Opaque presentation payloads.
pub mod payload;
/// Quests: stepwise side-path content with reveal gates.
pub mod quest;
/// The full chapter book loaded from JSON.
pub mod script;
/// Slides and their interaction kinds.
pub mod slide;
/// Structural checks over a loaded script.
pub mod validate;

/// Re-export chapter types.
pub use chapter::Chapter;
/// Re-export error types.
pub use error::{ScriptError, ScriptResult};
/// Re-export grant types.
pub use grant::{Grant, ItemGrant, Recipe};
/// Re-export identifier types.
pub use id::{ChapterId, HookId, ItemId, SideSlot, SlideId};
/// Re-export the payload type.
pub use payload::Payload;
/// Re-export quest types.
pub use quest::{Quest, QuestStep};
/// Re-export the script type.
pub use script::Script;
/// Re-export slide types.
pub use slide::{
    AdvanceSlide, ChoiceOption, ChoiceSlide, CustomerSlide, CustomerStage, EndingOption,
    EndingSlide, EndingTarget, Panel, QuizOption, QuizSlide, SidePaths, Slide, SlideKind,
};
/// Re-export validation types.
pub use validate::{Severity, ValidationIssue};
