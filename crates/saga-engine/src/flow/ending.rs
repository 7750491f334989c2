//! Ending resolver.

use saga_core::{EndingTarget, SlideKind};
use tracing::{debug, warn};

use crate::controller::{Engine, Outcome, Ports, Route, Transition, lost};
use crate::state::EngineState;

impl Engine {
    /// Pick an ending option.
    ///
    /// Grants, recipe and `on_advance` run exactly as for an advance. The
    /// option then jumps to its epilogue slide, or finishes the chapter.
    pub fn select_ending(&self, state: EngineState, index: usize, ports: &mut Ports<'_>) -> Transition {
        let Some((_, slide)) = self.locate(&state) else {
            return lost(state);
        };
        let SlideKind::Ending(ending) = &slide.kind else {
            debug!(kind = slide.kind_name(), "not an ending slide");
            return Transition::stay(state, Outcome::Unchanged);
        };
        let Some(option) = ending.options.get(index) else {
            warn!(index, "no such ending option");
            return Transition::stay(state, Outcome::Unchanged);
        };

        let route = match &option.target {
            EndingTarget::Slide(id) => Route::Jump(id),
            EndingTarget::Complete => Route::Complete,
        };
        self.commit(state, slide, route, None, ports)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use saga_core::{Chapter, ChapterId, EndingOption, EndingSlide, Grant, Script, Slide};
    use saga_profile::{ChapterUnlocks, PlayerProfile};

    use super::*;
    use crate::controller::Blocker;
    use crate::hooks::{HookOutcome, HookRegistry};
    use crate::testing::{Player, engine_for, start};

    fn ending() -> Slide {
        Slide::new(SlideKind::Ending(EndingSlide {
            options: vec![
                EndingOption::to_slide("epilogue", "epi"),
                EndingOption::complete("done"),
            ],
        }))
        .with_grant(Grant::currency(1))
    }

    #[test]
    fn plain_advance_is_blocked_on_endings() {
        let engine = engine_for(vec![ending(), Slide::solo().with_id("epi")]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Blocked(Blocker::EndingPending));
    }

    #[test]
    fn option_jumps_to_epilogue_with_rewards() {
        let engine = engine_for(vec![ending(), Slide::solo().with_id("epi")]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.select_ending(state, 0, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Moved);
        assert_eq!(t.state.slide_index(), 1);
        assert_eq!(player.inventory.currency(), 1);
    }

    #[test]
    fn sentinel_completes_the_chapter() {
        let finished = Rc::new(Cell::new(false));
        let flag = Rc::clone(&finished);
        let script = Script::new("ch1").with_chapter(
            Chapter::new("ch1")
                .with_slide(ending())
                .with_slide(Slide::solo().with_id("epi"))
                .with_on_finish("fin"),
        );
        let engine = Engine::new(script).with_hooks(HookRegistry::new().with("fin", move |_| {
            flag.set(true);
            Ok(HookOutcome::Continue)
        }));
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.select_ending(state, 1, &mut player.ports());
        assert_eq!(t.outcome, Outcome::ChapterComplete(ChapterId::new("ch1")));
        assert!(finished.get());
    }

    #[test]
    fn sentinel_follows_next_chapter_when_declared() {
        let script = Script::new("ch1")
            .with_chapter(Chapter::new("ch1").with_slide(ending().with_next_chapter("ch2")))
            .with_chapter(Chapter::new("ch2").with_slide(Slide::solo()));
        let engine = Engine::new(script);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.select_ending(state, 1, &mut player.ports());
        assert_eq!(t.outcome, Outcome::ChapterStarted(ChapterId::new("ch2")));
        assert!(player.unlocks.is_unlocked(&ChapterId::new("ch2")));
    }

    #[test]
    fn unknown_option_is_ignored() {
        let engine = engine_for(vec![ending(), Slide::solo().with_id("epi")]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.select_ending(state, 9, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Unchanged);
        assert_eq!(player.inventory.currency(), 0);
    }
}
