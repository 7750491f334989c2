//! Quiz resolver.

use saga_core::SlideKind;
use tracing::{debug, warn};

use crate::controller::{Engine, EngineEvent, Outcome, Transition, lost};
use crate::state::EngineState;

impl Engine {
    /// Answer the current quiz slide.
    ///
    /// A wrong answer disables only that option; retries are unlimited. The
    /// correct answer disables every option and unlocks advance.
    pub fn select_quiz(&self, mut state: EngineState, index: usize) -> Transition {
        let Some((_, slide)) = self.locate(&state) else {
            return lost(state);
        };
        let SlideKind::Quiz(quiz) = &slide.kind else {
            debug!(kind = slide.kind_name(), "not a quiz slide");
            return Transition::stay(state, Outcome::Unchanged);
        };
        let Some(option) = quiz.options.get(index) else {
            warn!(index, "no such quiz option");
            return Transition::stay(state, Outcome::Unchanged);
        };
        if state.quiz_option_disabled(index) {
            return Transition::stay(state, Outcome::Unchanged);
        }

        if option.correct {
            state.local.quiz_solved = true;
        } else {
            state.local.quiz_disabled.insert(index);
        }
        Transition::new(
            state,
            Outcome::Updated,
            vec![EngineEvent::QuizAnswered {
                index,
                correct: option.correct,
            }],
        )
    }
}
