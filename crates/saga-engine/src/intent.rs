//! User intents.
//!
//! A front-end turns clicks or typed commands into an [`Intent`] and hands
//! it to [`Engine::dispatch`]; every intent maps onto one engine operation.

use saga_core::{SideSlot, SlideId};

use crate::controller::{Engine, Outcome, Ports, Transition};
use crate::state::EngineState;

/// Something the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Commit the slide and move on.
    Advance,
    /// Open a side-path of the current slide.
    EnterSidePath(SideSlot),
    /// Close the open side-path.
    LeaveSidePath,
    /// Pick a choice option.
    SelectChoice(usize),
    /// Answer the quiz.
    SelectQuiz(usize),
    /// Reveal the current quest step, or the customer puzzle.
    Reveal,
    /// Move to the next quest step.
    QuestNext,
    /// Move the customer flow forward.
    CustomerNext,
    /// Move the customer flow back.
    CustomerBack,
    /// Pick an ending option.
    SelectEnding(usize),
    /// Jump to a slide of the current chapter.
    GotoSlide(SlideId),
}

impl Engine {
    /// Apply an intent to the state.
    pub fn dispatch(&self, state: EngineState, intent: &Intent, ports: &mut Ports<'_>) -> Transition {
        match intent {
            Intent::Advance => self.advance(state, ports),
            Intent::EnterSidePath(slot) => self.enter_side_path(state, *slot),
            Intent::LeaveSidePath => self.leave_side_path(state),
            Intent::SelectChoice(index) => self.select_choice(state, *index, ports),
            Intent::SelectQuiz(index) => self.select_quiz(state, *index),
            Intent::Reveal if state.quest_step().is_some() => self.quest_reveal(state, ports),
            Intent::Reveal => self.customer_reveal(state),
            Intent::QuestNext => self.quest_next(state, ports),
            Intent::CustomerNext => self.customer_next(state),
            Intent::CustomerBack => self.customer_back(state),
            Intent::SelectEnding(index) => self.select_ending(state, *index, ports),
            Intent::GotoSlide(id) => self.goto_slide_by_id(state, id.as_str(), ports),
        }
    }

    /// Apply intents in order, stopping early once the chapter completes.
    pub fn dispatch_all<'i>(
        &self,
        mut state: EngineState,
        intents: impl IntoIterator<Item = &'i Intent>,
        ports: &mut Ports<'_>,
    ) -> Transition {
        let mut events = Vec::new();
        let mut outcome = Outcome::Unchanged;
        for intent in intents {
            let t = self.dispatch(state, intent, ports);
            state = t.state;
            events.extend(t.events);
            outcome = t.outcome;
            if matches!(outcome, Outcome::ChapterComplete(_)) {
                break;
            }
        }
        Transition::new(state, outcome, events)
    }
}
