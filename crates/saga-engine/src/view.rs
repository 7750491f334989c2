//! What a front-end needs to draw the current slide.
//!
//! The engine never renders. [`Engine::view`] projects script data and
//! runtime state into a borrowed [`SlideView`], and a [`Presenter`] turns
//! that into pixels, text, or anything else.

use saga_core::{
    Chapter, CustomerStage, Panel, Payload, Quest, QuestStep, SideSlot, Slide, SlideKind,
};

use crate::controller::{Blocker, Engine, EngineEvent};
use crate::flow::customer::PUZZLE_STEP;
use crate::state::EngineState;

/// Renders slides and reacts to engine events.
pub trait Presenter {
    /// Draw the current slide.
    fn render(&mut self, view: &SlideView<'_>);

    /// Observe an event raised by a transition.
    fn notify(&mut self, _event: &EngineEvent) {}
}

/// One side-path button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePathStatus {
    /// Which slot.
    pub slot: SideSlot,
    /// Visited during this traversal.
    pub visited: bool,
    /// Needed before the slide can advance.
    pub required: bool,
}

/// The open side-path's content.
#[derive(Debug, Clone, Copy)]
pub enum PanelView<'a> {
    /// A static `loop` or `weird` panel.
    Side {
        /// Which slot.
        slot: SideSlot,
        /// Its content.
        panel: &'a Panel,
    },
    /// The quest stepper.
    Quest(QuestView<'a>),
}

/// The quest stepper at its current step.
#[derive(Debug, Clone, Copy)]
pub struct QuestView<'a> {
    /// The quest.
    pub quest: &'a Quest,
    /// Cursor position.
    pub step_index: usize,
    /// The step under the cursor.
    pub step: &'a QuestStep,
    /// Whether the step's reveal is shown.
    pub revealed: bool,
    /// Whether moving on needs the reveal first.
    pub requires_reveal: bool,
    /// Whether this is the final step.
    pub is_last: bool,
}

/// The customer mini-flow at its current stage.
#[derive(Debug, Clone, Copy)]
pub struct CustomerView<'a> {
    /// Current stage.
    pub stage: CustomerStage,
    /// Content of the current stage.
    pub content: &'a Payload,
    /// Whether the puzzle has been revealed.
    pub revealed: bool,
    /// The reveal, once revealed.
    pub reveal: Option<&'a Payload>,
}

/// Everything needed to draw the current slide.
#[derive(Debug, Clone)]
pub struct SlideView<'a> {
    /// The chapter being played.
    pub chapter: &'a Chapter,
    /// The current slide.
    pub slide: &'a Slide,
    /// Its index.
    pub slide_index: usize,
    /// Why advance is refused, if it is.
    pub blocker: Option<Blocker>,
    /// Side-path buttons, advance slides only.
    pub side_paths: Vec<SidePathStatus>,
    /// The open side-path.
    pub panel: Option<PanelView<'a>>,
    /// Picked choice option.
    pub chosen: Option<usize>,
    /// Quiz options that can no longer be picked.
    pub disabled_options: Vec<usize>,
    /// Customer flow, customer slides only.
    pub customer: Option<CustomerView<'a>>,
}

impl SlideView<'_> {
    /// Whether an advance would go through.
    pub fn can_advance(&self) -> bool {
        self.blocker.is_none()
    }
}

impl Engine {
    /// Project the state into a view. `None` if the state points nowhere.
    pub fn view(&self, state: &EngineState) -> Option<SlideView<'_>> {
        let (chapter, slide) = self.locate(state)?;
        let mut view = SlideView {
            chapter,
            slide,
            slide_index: state.slide_index(),
            blocker: self.blocker(state),
            side_paths: Vec::new(),
            panel: None,
            chosen: state.chosen(),
            disabled_options: Vec::new(),
            customer: None,
        };

        match &slide.kind {
            SlideKind::Advance(advance) => {
                let required = advance.required_slots();
                view.side_paths = advance
                    .side_paths
                    .available()
                    .into_iter()
                    .map(|slot| SidePathStatus {
                        slot,
                        visited: state.has_visited(slot),
                        required: required.contains(&slot),
                    })
                    .collect();
                view.panel = state.side_path().and_then(|slot| match slot {
                    SideSlot::Loop => advance
                        .side_paths
                        .loop_path
                        .as_ref()
                        .map(|panel| PanelView::Side { slot, panel }),
                    SideSlot::Weird => advance
                        .side_paths
                        .weird
                        .as_ref()
                        .map(|panel| PanelView::Side { slot, panel }),
                    SideSlot::Quest => {
                        let quest = advance.side_paths.quest.as_ref()?;
                        let step_index = state.quest_step()?;
                        let step = quest.steps.get(step_index)?;
                        Some(PanelView::Quest(QuestView {
                            quest,
                            step_index,
                            step,
                            revealed: state.is_revealed(step_index),
                            requires_reveal: quest.step_requires_reveal(step_index),
                            is_last: quest.last_index() == Some(step_index),
                        }))
                    }
                });
            }
            SlideKind::Quiz(quiz) => {
                view.disabled_options = (0..quiz.options.len())
                    .filter(|index| state.quiz_option_disabled(*index))
                    .collect();
            }
            SlideKind::Customer(customer) => {
                let stage = state.customer_stage();
                let revealed = state.is_revealed(PUZZLE_STEP);
                view.customer = Some(CustomerView {
                    stage,
                    content: customer.stage_content(stage),
                    revealed,
                    reveal: revealed.then_some(&customer.reveal),
                });
            }
            SlideKind::Solo | SlideKind::Choice(_) | SlideKind::Ending(_) => {}
        }
        Some(view)
    }
}
