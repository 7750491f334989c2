//! Quest stepper.
//!
//! A quest runs inside a slide's `quest` side-path. The step cursor lives in
//! the slide-local state and restarts at zero on each entry; reveals are
//! kept per slide, so a step revealed once stays open on re-entry.

use saga_core::{Quest, SideSlot, SlideKind};
use tracing::debug;

use crate::controller::{Blocker, Engine, EngineEvent, Outcome, Ports, Transition, apply_grants};
use crate::state::EngineState;

impl Engine {
    /// Reveal the current quest step and grant its reward. A second reveal
    /// of the same step does nothing.
    pub fn quest_reveal(&self, mut state: EngineState, ports: &mut Ports<'_>) -> Transition {
        let Some((quest, step)) = self.open_quest(&state) else {
            debug!("no quest open");
            return Transition::stay(state, Outcome::Unchanged);
        };
        if !state.reveal(step) {
            return Transition::stay(state, Outcome::Unchanged);
        }

        let mut events = vec![EngineEvent::StepRevealed { step }];
        if let Some(data) = quest.steps.get(step) {
            apply_grants(&data.reward, ports, &mut events);
        }
        Transition::new(state, Outcome::Updated, events)
    }

    /// Move to the next quest step, or complete the quest on the last one.
    ///
    /// A gated step that has not been revealed blocks. Completing grants the
    /// completion reward the first time only, runs `on_complete`, and closes
    /// the side-path.
    pub fn quest_next(&self, mut state: EngineState, ports: &mut Ports<'_>) -> Transition {
        let Some((quest, step)) = self.open_quest(&state) else {
            debug!("no quest open");
            return Transition::stay(state, Outcome::Unchanged);
        };
        if quest.step_requires_reveal(step) && !state.is_revealed(step) {
            return Transition::stay(state, Outcome::Blocked(Blocker::StepUnrevealed));
        }

        if step + 1 < quest.steps.len() {
            if let Some(cursor) = state.local.side_path.as_mut() {
                cursor.quest_step = step + 1;
            }
            return Transition::stay(state, Outcome::Updated);
        }

        let mut events = Vec::new();
        if state.complete_quest() {
            apply_grants(&quest.completion_reward, ports, &mut events);
        }
        events.push(EngineEvent::QuestCompleted);
        state.local.side_path = None;
        events.push(EngineEvent::SidePathLeft(SideSlot::Quest));

        if let Some(hook) = &quest.on_complete {
            let run = self.run_hook(hook, &state, None, ports, &mut events);
            state = match self.follow_request(run.request, state, ports, &mut events, 0) {
                Ok((state, outcome)) => return Transition::new(state, outcome, events),
                Err(state) => state,
            };
        }
        Transition::new(state, Outcome::Updated, events)
    }

    /// The open quest and the cursor's step.
    fn open_quest(&self, state: &EngineState) -> Option<(&Quest, usize)> {
        let step = state.quest_step()?;
        let (_, slide) = self.locate(state)?;
        let SlideKind::Advance(advance) = &slide.kind else {
            return None;
        };
        let quest = advance.side_paths.quest.as_ref()?;
        (step < quest.steps.len()).then_some((quest, step))
    }
}
