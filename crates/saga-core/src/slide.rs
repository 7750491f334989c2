//! Slides and their interaction kinds.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use crate::grant::{Grant, Recipe};
use crate::id::{ChapterId, HookId, SideSlot, SlideId};
use crate::payload::Payload;
use crate::quest::Quest;

/// One node of a chapter's script.
///
/// Fields shared by every kind live here; the interaction-specific data lives
/// in [`SlideKind`], which is flattened into the same JSON object and tagged
/// by its `kind` key. A slide without a `kind` is an advance slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Stable identifier for jumps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SlideId>,
    /// Interaction kind and its data.
    #[serde(flatten)]
    pub kind: SlideKind,
    /// Presentation data.
    #[serde(default)]
    pub content: Payload,
    /// Rewards applied when the slide is committed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<Grant>,
    /// Recipe attempted when the slide is committed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craft: Option<Recipe>,
    /// Hook invoked when the slide is entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_enter: Option<HookId>,
    /// Hook invoked when the slide is committed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_advance: Option<HookId>,
    /// Chapter to portal into when this slide finishes the chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_chapter_id: Option<ChapterId>,
}

impl Slide {
    /// Create a slide of the given kind with no common fields set.
    pub fn new(kind: SlideKind) -> Self {
        Self {
            id: None,
            kind,
            content: Payload::new(),
            grants: Vec::new(),
            craft: None,
            on_enter: None,
            on_advance: None,
            next_chapter_id: None,
        }
    }

    /// A plain advance slide without side-paths or gates.
    pub fn advance() -> Self {
        Self::new(SlideKind::Advance(AdvanceSlide::default()))
    }

    /// A single-action slide.
    pub fn solo() -> Self {
        Self::new(SlideKind::Solo)
    }

    /// Set the slide id.
    pub fn with_id(mut self, id: impl Into<SlideId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the presentation payload.
    pub fn with_content(mut self, content: Payload) -> Self {
        self.content = content;
        self
    }

    /// Add a grant.
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant);
        self
    }

    /// Attach a crafting recipe.
    pub fn with_craft(mut self, recipe: Recipe) -> Self {
        self.craft = Some(recipe);
        self
    }

    /// Set the enter hook.
    pub fn with_on_enter(mut self, hook: impl Into<HookId>) -> Self {
        self.on_enter = Some(hook.into());
        self
    }

    /// Set the advance hook.
    pub fn with_on_advance(mut self, hook: impl Into<HookId>) -> Self {
        self.on_advance = Some(hook.into());
        self
    }

    /// Set the chapter to portal into.
    pub fn with_next_chapter(mut self, chapter: impl Into<ChapterId>) -> Self {
        self.next_chapter_id = Some(chapter.into());
        self
    }

    /// Short name of the slide's kind.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether this slide carries the given id.
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_ref().is_some_and(|own| own.as_str() == id)
    }
}

/// The closed set of slide interaction kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideKind {
    /// Forward action, optionally gated behind side-paths.
    Advance(AdvanceSlide),
    /// A single forward action, no side-paths or gates.
    Solo,
    /// Mutually exclusive options; one must be picked before advancing.
    Choice(ChoiceSlide),
    /// Options of which exactly one is correct.
    Quiz(QuizSlide),
    /// Fixed bio, lore, puzzle flow.
    Customer(CustomerSlide),
    /// Options mapping to epilogue slides or to chapter completion.
    Ending(EndingSlide),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedKind {
    Advance(AdvanceSlide),
    Solo,
    Choice(ChoiceSlide),
    Quiz(QuizSlide),
    Customer(CustomerSlide),
    Ending(EndingSlide),
}

impl From<TaggedKind> for SlideKind {
    fn from(tagged: TaggedKind) -> Self {
        match tagged {
            TaggedKind::Advance(advance) => Self::Advance(advance),
            TaggedKind::Solo => Self::Solo,
            TaggedKind::Choice(choice) => Self::Choice(choice),
            TaggedKind::Quiz(quiz) => Self::Quiz(quiz),
            TaggedKind::Customer(customer) => Self::Customer(customer),
            TaggedKind::Ending(ending) => Self::Ending(ending),
        }
    }
}

impl<'de> Deserialize<'de> for SlideKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        fields.entry("kind").or_insert_with(|| Value::from("advance"));
        TaggedKind::deserialize(Value::Object(fields))
            .map(Self::from)
            .map_err(de::Error::custom)
    }
}

impl SlideKind {
    /// Short name of the kind, matching its JSON tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance(_) => "advance",
            Self::Solo => "solo",
            Self::Choice(_) => "choice",
            Self::Quiz(_) => "quiz",
            Self::Customer(_) => "customer",
            Self::Ending(_) => "ending",
        }
    }
}

/// Data for [`SlideKind::Advance`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvanceSlide {
    /// Optional detours.
    pub side_paths: SidePaths,
    /// Side-paths that must be visited before advancing.
    pub require_visited: Vec<SideSlot>,
    /// Shorthand requiring all three side-paths.
    pub require_all_side_paths: bool,
}

impl AdvanceSlide {
    /// Create an advance slide without side-paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a `loop` detour.
    pub fn with_loop(mut self, panel: Panel) -> Self {
        self.side_paths.loop_path = Some(panel);
        self
    }

    /// Offer a `quest` detour.
    pub fn with_quest(mut self, quest: Quest) -> Self {
        self.side_paths.quest = Some(quest);
        self
    }

    /// Offer a `weird` detour.
    pub fn with_weird(mut self, panel: Panel) -> Self {
        self.side_paths.weird = Some(panel);
        self
    }

    /// Require the given slots to be visited.
    pub fn requiring(mut self, slots: impl IntoIterator<Item = SideSlot>) -> Self {
        self.require_visited.extend(slots);
        self
    }

    /// Require all three slots to be visited.
    pub fn requiring_all(mut self) -> Self {
        self.require_all_side_paths = true;
        self
    }

    /// The slots that gate this slide, without duplicates.
    pub fn required_slots(&self) -> Vec<SideSlot> {
        if self.require_all_side_paths {
            return SideSlot::ALL.to_vec();
        }
        let mut slots = Vec::new();
        for slot in &self.require_visited {
            if !slots.contains(slot) {
                slots.push(*slot);
            }
        }
        slots
    }
}

/// The three optional detours of an advance slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidePaths {
    /// Content shown by the `loop` detour.
    #[serde(rename = "loop")]
    pub loop_path: Option<Panel>,
    /// Quest run by the `quest` detour.
    pub quest: Option<Quest>,
    /// Content shown by the `weird` detour.
    pub weird: Option<Panel>,
}

impl SidePaths {
    /// Whether the slot is defined.
    pub fn has(&self, slot: SideSlot) -> bool {
        match slot {
            SideSlot::Loop => self.loop_path.is_some(),
            SideSlot::Quest => self.quest.is_some(),
            SideSlot::Weird => self.weird.is_some(),
        }
    }

    /// Defined slots in display order.
    pub fn available(&self) -> Vec<SideSlot> {
        [SideSlot::Loop, SideSlot::Quest, SideSlot::Weird]
            .into_iter()
            .filter(|slot| self.has(*slot))
            .collect()
    }
}

/// Static content shown by a `loop` or `weird` detour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// Presentation data.
    #[serde(default)]
    pub content: Payload,
}

impl Panel {
    /// Create a panel.
    pub fn new(content: Payload) -> Self {
        Self { content }
    }
}

/// Data for [`SlideKind::Choice`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSlide {
    /// Options in display order.
    pub options: Vec<ChoiceOption>,
}

/// One option of a choice slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Text shown to the player.
    pub label: String,
    /// Hook invoked when the option is picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_select: Option<HookId>,
    /// Chapter to portal into when advancing after this option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_chapter_id: Option<ChapterId>,
    /// Slide to jump to when advancing after this option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<SlideId>,
}

impl ChoiceOption {
    /// Create an option with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the selection hook.
    pub fn with_on_select(mut self, hook: impl Into<HookId>) -> Self {
        self.on_select = Some(hook.into());
        self
    }

    /// Portal into a chapter after this option.
    pub fn portal_to(mut self, chapter: impl Into<ChapterId>) -> Self {
        self.next_chapter_id = Some(chapter.into());
        self
    }

    /// Jump to a slide after this option.
    pub fn jump_to(mut self, slide: impl Into<SlideId>) -> Self {
        self.next_id = Some(slide.into());
        self
    }
}

/// Data for [`SlideKind::Quiz`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSlide {
    /// Options in display order.
    pub options: Vec<QuizOption>,
}

impl QuizSlide {
    /// Index of the correct option, if exactly one is marked correct.
    pub fn correct_index(&self) -> Option<usize> {
        let mut correct = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.correct);
        match (correct.next(), correct.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }
}

/// One option of a quiz slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// Text shown to the player.
    pub label: String,
    /// Whether this is the right answer.
    #[serde(default)]
    pub correct: bool,
}

impl QuizOption {
    /// A wrong answer.
    pub fn wrong(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            correct: false,
        }
    }

    /// The right answer.
    pub fn right(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            correct: true,
        }
    }
}

/// Data for [`SlideKind::Customer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerSlide {
    /// First stage content.
    pub bio: Payload,
    /// Second stage content.
    pub lore: Payload,
    /// Third stage content.
    pub puzzle: Payload,
    /// Disclosed by the puzzle's reveal action.
    pub reveal: Payload,
}

impl CustomerSlide {
    /// Content for a stage.
    pub fn stage_content(&self, stage: CustomerStage) -> &Payload {
        match stage {
            CustomerStage::Bio => &self.bio,
            CustomerStage::Lore => &self.lore,
            CustomerStage::Puzzle => &self.puzzle,
        }
    }
}

/// Stages of the customer flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStage {
    /// Stage 0.
    #[default]
    Bio,
    /// Stage 1.
    Lore,
    /// Stage 2, gated by a reveal.
    Puzzle,
}

impl CustomerStage {
    /// Zero-based stage number.
    pub fn index(self) -> usize {
        match self {
            Self::Bio => 0,
            Self::Lore => 1,
            Self::Puzzle => 2,
        }
    }

    /// The following stage, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Bio => Some(Self::Lore),
            Self::Lore => Some(Self::Puzzle),
            Self::Puzzle => None,
        }
    }

    /// The preceding stage, if any.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Bio => None,
            Self::Lore => Some(Self::Bio),
            Self::Puzzle => Some(Self::Lore),
        }
    }
}

impl fmt::Display for CustomerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bio => write!(f, "bio"),
            Self::Lore => write!(f, "lore"),
            Self::Puzzle => write!(f, "puzzle"),
        }
    }
}

/// Data for [`SlideKind::Ending`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingSlide {
    /// Options in display order.
    pub options: Vec<EndingOption>,
}

/// One option of an ending slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingOption {
    /// Text shown to the player.
    pub label: String,
    /// Where the option leads.
    pub target: EndingTarget,
}

impl EndingOption {
    /// An option jumping to a slide of the current chapter.
    pub fn to_slide(label: impl Into<String>, slide: impl Into<SlideId>) -> Self {
        Self {
            label: label.into(),
            target: EndingTarget::Slide(slide.into()),
        }
    }

    /// An option completing the chapter.
    pub fn complete(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: EndingTarget::Complete,
        }
    }
}

/// Destination of an ending option.
///
/// Serialized as `{"slide": "id"}` or as the sentinel `"complete"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingTarget {
    /// Jump to a slide of the current chapter.
    Slide(SlideId),
    /// Treat as chapter completion.
    Complete,
}
