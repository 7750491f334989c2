//! Customer mini-flow: bio, lore, then a puzzle that must be revealed
//! before it can be served.

use saga_core::{CustomerStage, SlideKind};
use tracing::debug;

use crate::controller::{Engine, EngineEvent, Outcome, Ports, Transition};
use crate::state::EngineState;

/// Reveal key of the puzzle stage.
pub(crate) const PUZZLE_STEP: usize = 2;

impl Engine {
    /// Step forward through bio and lore.
    pub fn customer_next(&self, mut state: EngineState) -> Transition {
        if !self.on_customer(&state) {
            return Transition::stay(state, Outcome::Unchanged);
        }
        match state.customer_stage().next() {
            Some(stage) => {
                state.local.customer_stage = stage;
                Transition::stay(state, Outcome::Updated)
            }
            None => Transition::stay(state, Outcome::Unchanged),
        }
    }

    /// Step back towards the bio.
    pub fn customer_back(&self, mut state: EngineState) -> Transition {
        if !self.on_customer(&state) {
            return Transition::stay(state, Outcome::Unchanged);
        }
        match state.customer_stage().previous() {
            Some(stage) => {
                state.local.customer_stage = stage;
                Transition::stay(state, Outcome::Updated)
            }
            None => Transition::stay(state, Outcome::Unchanged),
        }
    }

    /// Reveal the puzzle. Only available on the puzzle stage, and only once.
    pub fn customer_reveal(&self, mut state: EngineState) -> Transition {
        if !self.on_customer(&state) || state.customer_stage() != CustomerStage::Puzzle {
            return Transition::stay(state, Outcome::Unchanged);
        }
        if !state.reveal(PUZZLE_STEP) {
            return Transition::stay(state, Outcome::Unchanged);
        }
        Transition::new(state, Outcome::Updated, vec![EngineEvent::PuzzleRevealed])
    }

    /// Serve the customer: an ordinary advance once the puzzle is revealed.
    pub fn serve(&self, state: EngineState, ports: &mut Ports<'_>) -> Transition {
        if !self.on_customer(&state) {
            return Transition::stay(state, Outcome::Unchanged);
        }
        self.advance(state, ports)
    }

    fn on_customer(&self, state: &EngineState) -> bool {
        let customer = self
            .locate(state)
            .is_some_and(|(_, slide)| matches!(slide.kind, SlideKind::Customer(_)));
        if !customer {
            debug!("not a customer slide");
        }
        customer
    }
}
