//! Choice resolver.

use saga_core::SlideKind;
use tracing::{debug, warn};

use crate::controller::{Engine, EngineEvent, Outcome, Ports, Transition, lost};
use crate::state::EngineState;

impl Engine {
    /// Pick one option of the current choice slide.
    ///
    /// The first pick locks the slide's options for the rest of the visit
    /// and runs the option's `on_select` hook. Advance then follows the
    /// option's portal or jump, if it names one.
    pub fn select_choice(
        &self,
        mut state: EngineState,
        index: usize,
        ports: &mut Ports<'_>,
    ) -> Transition {
        let Some((_, slide)) = self.locate(&state) else {
            return lost(state);
        };
        let SlideKind::Choice(choice) = &slide.kind else {
            debug!(kind = slide.kind_name(), "not a choice slide");
            return Transition::stay(state, Outcome::Unchanged);
        };
        if state.chosen().is_some() {
            return Transition::stay(state, Outcome::Unchanged);
        }
        let Some(option) = choice.options.get(index) else {
            warn!(index, "no such choice option");
            return Transition::stay(state, Outcome::Unchanged);
        };

        state.local.choice = Some(index);
        let mut events = vec![EngineEvent::ChoiceSelected { index }];
        if let Some(hook) = &option.on_select {
            let run = self.run_hook(hook, &state, Some(option), ports, &mut events);
            state = match self.follow_request(run.request, state, ports, &mut events, 0) {
                Ok((state, outcome)) => return Transition::new(state, outcome, events),
                Err(state) => state,
            };
        }
        Transition::new(state, Outcome::Updated, events)
    }
}
