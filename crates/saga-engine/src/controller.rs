//! Navigation and gating controller.
//!
//! Every public operation takes the current [`EngineState`] by value and
//! returns a [`Transition`]. Operations that cannot apply (a gate is unmet, a
//! target is missing, the state points nowhere) hand the state back
//! unchanged with an explanatory [`Outcome`] rather than failing.

use std::fmt;
use std::path::Path;

use saga_core::{
    Chapter, ChapterId, ChoiceOption, CustomerStage, Grant, HookId, ItemId, Script, SideSlot,
    Slide, SlideId, SlideKind,
};
use saga_profile::{ChapterUnlocks, CraftOutcome, Ledger, LedgerEvent, PlayerProfile};
use tracing::{debug, warn};

use crate::config::{CelebrationPolicy, EngineConfig};
use crate::context::{HookContext, HookRequest};
use crate::error::{EngineError, EngineResult};
use crate::flow::customer::PUZZLE_STEP;
use crate::hooks::{HookOutcome, HookRegistry};
use crate::state::{EngineState, SidePathCursor};

/// The player-owned collaborators a transition may touch.
pub struct Ports<'a> {
    /// Inventory, wallet and persistence.
    pub profile: &'a mut dyn PlayerProfile,
    /// The unlocked-chapter set.
    pub unlocks: &'a mut dyn ChapterUnlocks,
}

impl<'a> Ports<'a> {
    /// Bundle a profile and an unlock set.
    pub fn new(profile: &'a mut dyn PlayerProfile, unlocks: &'a mut dyn ChapterUnlocks) -> Self {
        Self { profile, unlocks }
    }
}

/// Why the current slide cannot advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker {
    /// A side-path is open; leave it first.
    InSidePath(SideSlot),
    /// Required side-paths not yet visited.
    MissingSidePaths(Vec<SideSlot>),
    /// No choice option has been picked.
    ChoicePending,
    /// The quiz has not been answered correctly.
    QuizPending,
    /// The customer flow has not reached the puzzle.
    CustomerStage(CustomerStage),
    /// The customer puzzle has not been revealed.
    PuzzleUnrevealed,
    /// The current quest step must be revealed before moving on.
    StepUnrevealed,
    /// Ending slides move on only through one of their options.
    EndingPending,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSidePath(slot) => write!(f, "inside the {slot} side-path"),
            Self::MissingSidePaths(slots) => {
                let names: Vec<&str> = slots.iter().map(|slot| slot.name()).collect();
                write!(f, "visit first: {}", names.join(", "))
            }
            Self::ChoicePending => write!(f, "pick an option first"),
            Self::QuizPending => write!(f, "answer the quiz first"),
            Self::CustomerStage(stage) => write!(f, "still at the {stage} stage"),
            Self::PuzzleUnrevealed => write!(f, "reveal the puzzle first"),
            Self::StepUnrevealed => write!(f, "reveal this step first"),
            Self::EndingPending => write!(f, "choose an ending"),
        }
    }
}

/// What a transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed.
    Unchanged,
    /// Slide-local state changed; the slide is the same.
    Updated,
    /// Advance was refused.
    Blocked(Blocker),
    /// The current slide changed within the chapter.
    Moved,
    /// A hook took over the transition.
    Handled,
    /// A new chapter started and replaced the state.
    ChapterStarted(ChapterId),
    /// The chapter finished; the player returns to chapter select.
    ChapterComplete(ChapterId),
}

/// Something observable that happened during a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A slide became current.
    SlideEntered {
        /// Its chapter.
        chapter_id: ChapterId,
        /// Its index.
        slide_index: usize,
    },
    /// A side-path was opened.
    SidePathEntered(SideSlot),
    /// A side-path was closed.
    SidePathLeft(SideSlot),
    /// A quest step was revealed.
    StepRevealed {
        /// Step index.
        step: usize,
    },
    /// The last quest step was passed.
    QuestCompleted,
    /// A choice option was picked.
    ChoiceSelected {
        /// Option index.
        index: usize,
    },
    /// A quiz option was picked.
    QuizAnswered {
        /// Option index.
        index: usize,
        /// Whether it was the correct one.
        correct: bool,
    },
    /// The customer puzzle was revealed.
    PuzzleRevealed,
    /// The reward ledger changed.
    Ledger(LedgerEvent),
    /// Every prerequisite of the slide's recipe is held.
    PrerequisitesHeld {
        /// The recipe's product.
        produces: ItemId,
    },
    /// A chapter was added to the unlock set.
    ChapterUnlocked(ChapterId),
    /// A chapter traversal began.
    ChapterStarted(ChapterId),
    /// A chapter traversal finished.
    ChapterCompleted(ChapterId),
}

/// The result of one engine operation.
#[derive(Debug)]
pub struct Transition {
    /// State after the operation.
    pub state: EngineState,
    /// What happened.
    pub outcome: Outcome,
    /// Events raised, in order.
    pub events: Vec<EngineEvent>,
}

impl Transition {
    pub(crate) fn new(state: EngineState, outcome: Outcome, events: Vec<EngineEvent>) -> Self {
        Self {
            state,
            outcome,
            events,
        }
    }

    pub(crate) fn stay(state: EngineState, outcome: Outcome) -> Self {
        Self::new(state, outcome, Vec::new())
    }

    /// Whether advance was refused.
    pub fn is_blocked(&self) -> bool {
        matches!(self.outcome, Outcome::Blocked(_))
    }

    /// Whether the chapter was completed.
    pub fn is_chapter_complete(&self) -> bool {
        matches!(self.outcome, Outcome::ChapterComplete(_))
    }
}

/// Where a committed slide leads.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Route<'s> {
    /// Next slide, or finish the chapter on the last one.
    Linear,
    /// A slide of the current chapter.
    Jump(&'s SlideId),
    /// Finish and start another chapter, whatever the slide index.
    Portal(&'s ChapterId),
    /// Finish the chapter.
    Complete,
}

impl<'s> Route<'s> {
    pub(crate) fn for_option(option: &'s ChoiceOption) -> Self {
        if let Some(chapter) = &option.next_chapter_id {
            Route::Portal(chapter)
        } else if let Some(slide) = &option.next_id {
            Route::Jump(slide)
        } else {
            Route::Linear
        }
    }
}

pub(crate) struct HookRun {
    pub outcome: HookOutcome,
    pub request: Option<HookRequest>,
}

type Step = (EngineState, Outcome);

/// The chapter engine: a script, its hooks, and configuration.
#[derive(Debug)]
pub struct Engine {
    script: Script,
    hooks: HookRegistry,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine for a script with no hooks and default config.
    pub fn new(script: Script) -> Self {
        Self {
            script,
            hooks: HookRegistry::new(),
            config: EngineConfig::default(),
        }
    }

    /// Load a script from a JSON file.
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        Ok(Self::new(Script::from_path(path)?))
    }

    /// Set the hook registry.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The script being played.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a chapter with fresh state on its first slide.
    pub fn start_chapter(&self, id: &ChapterId, ports: &mut Ports<'_>) -> EngineResult<Transition> {
        let Some(chapter) = self.script.chapter(id.as_str()) else {
            warn!(chapter = %id, "cannot start unknown chapter");
            return Err(EngineError::UnknownChapter(id.clone()));
        };
        if chapter.slides.is_empty() {
            warn!(chapter = %id, "cannot start empty chapter");
            return Err(EngineError::EmptyChapter(id.clone()));
        }

        debug!(chapter = %id, "chapter started");
        let mut events = vec![EngineEvent::ChapterStarted(id.clone())];
        let (state, redirected) = self.enter(EngineState::new(id.clone()), ports, &mut events, 0);
        let outcome = redirected.unwrap_or_else(|| Outcome::ChapterStarted(id.clone()));
        Ok(Transition::new(state, outcome, events))
    }

    /// Why the current slide cannot advance, if it cannot.
    pub fn blocker(&self, state: &EngineState) -> Option<Blocker> {
        let (_, slide) = self.locate(state)?;
        if let Some(slot) = state.side_path() {
            return Some(Blocker::InSidePath(slot));
        }
        match &slide.kind {
            SlideKind::Advance(advance) => {
                let missing: Vec<SideSlot> = advance
                    .required_slots()
                    .into_iter()
                    .filter(|slot| !state.has_visited(*slot))
                    .collect();
                (!missing.is_empty()).then_some(Blocker::MissingSidePaths(missing))
            }
            SlideKind::Solo => None,
            SlideKind::Choice(_) => state.chosen().is_none().then_some(Blocker::ChoicePending),
            SlideKind::Quiz(_) => (!state.quiz_solved()).then_some(Blocker::QuizPending),
            SlideKind::Customer(_) => match state.customer_stage() {
                CustomerStage::Puzzle if state.is_revealed(PUZZLE_STEP) => None,
                CustomerStage::Puzzle => Some(Blocker::PuzzleUnrevealed),
                stage => Some(Blocker::CustomerStage(stage)),
            },
            SlideKind::Ending(_) => Some(Blocker::EndingPending),
        }
    }

    /// Commit the current slide and move on.
    ///
    /// A no-op while the slide is blocked. Otherwise applies the slide's
    /// grants and recipe, runs `on_advance`, then routes: a picked choice
    /// option's portal or jump, else the next slide, else the chapter's
    /// finish (portalling into `next_chapter_id` when the last slide names
    /// one).
    pub fn advance(&self, state: EngineState, ports: &mut Ports<'_>) -> Transition {
        let Some((_, slide)) = self.locate(&state) else {
            return lost(state);
        };
        if let Some(blocker) = self.blocker(&state) {
            debug!(%blocker, "advance blocked");
            return Transition::stay(state, Outcome::Blocked(blocker));
        }

        let (route, choice) = match &slide.kind {
            SlideKind::Choice(choice) => {
                let option = state.chosen().and_then(|index| choice.options.get(index));
                (option.map_or(Route::Linear, Route::for_option), option)
            }
            _ => (Route::Linear, None),
        };
        self.commit(state, slide, route, choice, ports)
    }

    /// Jump to the slide of the current chapter with the given id.
    pub fn goto_slide_by_id(&self, state: EngineState, id: &str, ports: &mut Ports<'_>) -> Transition {
        let Some(index) = self.position(&state, id) else {
            warn!(slide = id, chapter = %state.chapter_id, "no slide with this id");
            return Transition::stay(state, Outcome::Unchanged);
        };
        let mut events = Vec::new();
        let (state, outcome) = self.move_to(state, index, ports, &mut events, 0);
        Transition::new(state, outcome, events)
    }

    /// Open one of the current slide's side-paths and record the visit.
    pub fn enter_side_path(&self, mut state: EngineState, slot: SideSlot) -> Transition {
        let Some((_, slide)) = self.locate(&state) else {
            return lost(state);
        };
        if let Some(open) = state.side_path() {
            debug!(%open, "a side-path is already open");
            return Transition::stay(state, Outcome::Unchanged);
        }
        let SlideKind::Advance(advance) = &slide.kind else {
            warn!(%slot, kind = slide.kind_name(), "slide has no side-paths");
            return Transition::stay(state, Outcome::Unchanged);
        };
        let paths = &advance.side_paths;
        let usable = match slot {
            SideSlot::Loop => paths.loop_path.is_some(),
            SideSlot::Weird => paths.weird.is_some(),
            SideSlot::Quest => paths
                .quest
                .as_ref()
                .is_some_and(|quest| !quest.steps.is_empty()),
        };
        if !usable {
            warn!(%slot, chapter = %state.chapter_id, slide = state.slide_index, "side-path is missing or malformed");
            return Transition::stay(state, Outcome::Unchanged);
        }

        state.visit(slot);
        state.local.side_path = Some(SidePathCursor {
            slot,
            quest_step: 0,
        });
        Transition::new(
            state,
            Outcome::Updated,
            vec![EngineEvent::SidePathEntered(slot)],
        )
    }

    /// Close the open side-path and return to the slide.
    pub fn leave_side_path(&self, mut state: EngineState) -> Transition {
        match state.local.side_path.take() {
            Some(cursor) => Transition::new(
                state,
                Outcome::Updated,
                vec![EngineEvent::SidePathLeft(cursor.slot)],
            ),
            None => Transition::stay(state, Outcome::Unchanged),
        }
    }

    pub(crate) fn locate(&self, state: &EngineState) -> Option<(&Chapter, &Slide)> {
        let chapter = self.script.chapter(state.chapter_id.as_str())?;
        let slide = chapter.slide(state.slide_index)?;
        Some((chapter, slide))
    }

    fn position(&self, state: &EngineState, id: &str) -> Option<usize> {
        self.script
            .chapter(state.chapter_id.as_str())?
            .position_of(id)
    }

    /// Apply a slide's rewards and `on_advance`, then follow `route`.
    pub(crate) fn commit(
        &self,
        mut state: EngineState,
        slide: &Slide,
        route: Route<'_>,
        choice: Option<&ChoiceOption>,
        ports: &mut Ports<'_>,
    ) -> Transition {
        let mut events = Vec::new();
        {
            let mut ledger = Ledger::new(&mut *ports.profile);
            ledger.apply(&slide.grants);
            let crafted = slide
                .craft
                .as_ref()
                .is_some_and(|recipe| ledger.craft(recipe) == CraftOutcome::Crafted);
            events.extend(ledger.into_events().into_iter().map(EngineEvent::Ledger));
            if crafted
                && self.config.celebration == CelebrationPolicy::OnCraft
                && let Some(recipe) = &slide.craft
            {
                events.push(EngineEvent::PrerequisitesHeld {
                    produces: recipe.produces.clone(),
                });
            }
        }

        if let Some(hook) = &slide.on_advance {
            let run = self.run_hook(hook, &state, choice, ports, &mut events);
            state = match self.follow_request(run.request, state, ports, &mut events, 0) {
                Ok((state, outcome)) => return Transition::new(state, outcome, events),
                Err(state) => state,
            };
            if run.outcome == HookOutcome::Handled {
                debug!(%hook, "transition handled by hook");
                return Transition::new(state, Outcome::Handled, events);
            }
        }

        let (state, outcome) = self.route(state, route, ports, &mut events, 0);
        Transition::new(state, outcome, events)
    }

    fn route(
        &self,
        state: EngineState,
        route: Route<'_>,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
        depth: usize,
    ) -> Step {
        match route {
            Route::Portal(target) => self
                .finish_into(state, target, ports, events, depth)
                .unwrap_or_else(|state| (state, Outcome::Unchanged)),
            Route::Jump(id) => match self.position(&state, id.as_str()) {
                Some(index) => self.move_to(state, index, ports, events, depth),
                None => {
                    warn!(slide = %id, "jump target not found");
                    (state, Outcome::Unchanged)
                }
            },
            Route::Complete => {
                let next = self.locate(&state).and_then(|(_, slide)| slide.next_chapter_id.as_ref());
                self.finish(state, next, ports, events, depth)
            }
            Route::Linear => {
                let Some((chapter, slide)) = self.locate(&state) else {
                    return (state, Outcome::Unchanged);
                };
                if chapter.is_last(state.slide_index) {
                    self.finish(state, slide.next_chapter_id.as_ref(), ports, events, depth)
                } else {
                    let next = state.slide_index + 1;
                    self.move_to(state, next, ports, events, depth)
                }
            }
        }
    }

    fn move_to(
        &self,
        mut state: EngineState,
        index: usize,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
        depth: usize,
    ) -> Step {
        state.move_to(index);
        let (state, redirected) = self.enter(state, ports, events, depth);
        (state, redirected.unwrap_or(Outcome::Moved))
    }

    /// Run entry effects for the current slide. Returns the outcome of any
    /// redirect an `on_enter` hook asked for.
    fn enter(
        &self,
        state: EngineState,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
        depth: usize,
    ) -> (EngineState, Option<Outcome>) {
        debug!(chapter = %state.chapter_id, slide = state.slide_index, "slide entered");
        events.push(EngineEvent::SlideEntered {
            chapter_id: state.chapter_id.clone(),
            slide_index: state.slide_index,
        });
        let Some((_, slide)) = self.locate(&state) else {
            return (state, None);
        };

        if self.config.celebration == CelebrationPolicy::EveryVisit
            && let Some(recipe) = &slide.craft
            && Ledger::new(&mut *ports.profile).prerequisites_held(recipe)
        {
            events.push(EngineEvent::PrerequisitesHeld {
                produces: recipe.produces.clone(),
            });
        }

        let Some(hook) = &slide.on_enter else {
            return (state, None);
        };
        let run = self.run_hook(hook, &state, None, ports, events);
        if run.request.is_some() && depth >= self.config.max_redirects {
            warn!(%hook, limit = self.config.max_redirects, "redirect limit reached");
            return (state, None);
        }
        match self.follow_request(run.request, state, ports, events, depth + 1) {
            Ok((state, outcome)) => (state, Some(outcome)),
            Err(state) => (state, None),
        }
    }

    /// Finish the chapter: portal into `next` when given, else complete.
    fn finish(
        &self,
        state: EngineState,
        next: Option<&ChapterId>,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
        depth: usize,
    ) -> Step {
        match next {
            Some(target) => self
                .finish_into(state, target, ports, events, depth)
                .unwrap_or_else(|state| (state, Outcome::Unchanged)),
            None => {
                self.close_chapter(&state, ports, events);
                let id = state.chapter_id.clone();
                (state, Outcome::ChapterComplete(id))
            }
        }
    }

    /// Run `on_finish`, unlock `target`, and start it. Hands the state back
    /// untouched if `target` cannot be started.
    fn finish_into(
        &self,
        state: EngineState,
        target: &ChapterId,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
        depth: usize,
    ) -> Result<Step, EngineState> {
        match self.script.chapter(target.as_str()) {
            None => {
                warn!(chapter = %target, "cannot portal into unknown chapter");
                return Err(state);
            }
            Some(chapter) if chapter.slides.is_empty() => {
                warn!(chapter = %target, "cannot portal into empty chapter");
                return Err(state);
            }
            Some(_) => {}
        }

        self.close_chapter(&state, ports, events);
        if ports.unlocks.unlock(target) {
            events.push(EngineEvent::ChapterUnlocked(target.clone()));
        }
        debug!(from = %state.chapter_id, to = %target, "chapter portal");
        events.push(EngineEvent::ChapterStarted(target.clone()));
        let (state, redirected) = self.enter(EngineState::new(target.clone()), ports, events, depth);
        Ok((
            state,
            redirected.unwrap_or_else(|| Outcome::ChapterStarted(target.clone())),
        ))
    }

    fn close_chapter(&self, state: &EngineState, ports: &mut Ports<'_>, events: &mut Vec<EngineEvent>) {
        let on_finish = self
            .script
            .chapter(state.chapter_id.as_str())
            .and_then(|chapter| chapter.on_finish.as_ref());
        if let Some(hook) = on_finish {
            let run = self.run_hook(hook, state, None, ports, events);
            if run.request.is_some() {
                debug!(%hook, "navigation requested by on_finish is ignored");
            }
        }
        events.push(EngineEvent::ChapterCompleted(state.chapter_id.clone()));
    }

    pub(crate) fn run_hook(
        &self,
        hook: &HookId,
        state: &EngineState,
        choice: Option<&ChoiceOption>,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
    ) -> HookRun {
        let mut ctx = HookContext::new(
            Ledger::new(&mut *ports.profile),
            &state.chapter_id,
            state.slide_index,
            choice,
        );
        let outcome = self.hooks.invoke(hook, &mut ctx);
        let (ledger_events, request) = ctx.into_parts();
        events.extend(ledger_events.into_iter().map(EngineEvent::Ledger));
        match outcome {
            Some(outcome) => HookRun { outcome, request },
            None => HookRun {
                outcome: HookOutcome::Continue,
                request: None,
            },
        }
    }

    /// Follow a hook's navigation request. Hands the state back when there
    /// is no request or it cannot be followed.
    pub(crate) fn follow_request(
        &self,
        request: Option<HookRequest>,
        state: EngineState,
        ports: &mut Ports<'_>,
        events: &mut Vec<EngineEvent>,
        depth: usize,
    ) -> Result<Step, EngineState> {
        match request {
            None => Err(state),
            Some(HookRequest::JumpTo(id)) => match self.position(&state, id.as_str()) {
                Some(index) => Ok(self.move_to(state, index, ports, events, depth)),
                None => {
                    warn!(slide = %id, "hook jumped to unknown slide");
                    Err(state)
                }
            },
            Some(HookRequest::OpenChapter(target)) => {
                self.finish_into(state, &target, ports, events, depth)
            }
        }
    }
}

pub(crate) fn apply_grants(grants: &[Grant], ports: &mut Ports<'_>, events: &mut Vec<EngineEvent>) {
    if grants.is_empty() {
        return;
    }
    let mut ledger = Ledger::new(&mut *ports.profile);
    ledger.apply(grants);
    events.extend(ledger.into_events().into_iter().map(EngineEvent::Ledger));
}

pub(crate) fn lost(state: EngineState) -> Transition {
    warn!(chapter = %state.chapter_id, slide = state.slide_index, "state does not point at a slide");
    Transition::stay(state, Outcome::Unchanged)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::HookError;
    use crate::testing::{FailingProfile, Player, engine_for, start};
    use proptest::prelude::*;
    use saga_core::{AdvanceSlide, Panel, Payload, Quest, QuestStep, Recipe};

    fn gated_slide(slots: &[SideSlot]) -> Slide {
        let advance = AdvanceSlide::new()
            .with_loop(Panel::new(Payload::text("loop")))
            .with_weird(Panel::new(Payload::text("weird")))
            .with_quest(Quest::new().with_step(QuestStep::new(Payload::text("step"))))
            .requiring(slots.iter().copied());
        Slide::new(SlideKind::Advance(advance))
    }

    fn all_gated() -> Slide {
        let advance = AdvanceSlide::new()
            .with_loop(Panel::new(Payload::text("loop")))
            .with_weird(Panel::new(Payload::text("weird")))
            .with_quest(Quest::new().with_step(QuestStep::new(Payload::text("step"))))
            .requiring_all();
        Slide::new(SlideKind::Advance(advance))
    }

    fn visit(engine: &Engine, state: EngineState, slot: SideSlot) -> EngineState {
        let state = engine.enter_side_path(state, slot).state;
        engine.leave_side_path(state).state
    }

    #[test]
    fn gate_blocks_until_every_side_path_is_visited() {
        let engine = engine_for(vec![all_gated(), Slide::solo()]);
        let mut player = Player::new();
        let mut state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert!(t.is_blocked());
        assert_eq!(t.state.slide_index(), 0);
        state = t.state;

        for slot in [SideSlot::Quest, SideSlot::Loop, SideSlot::Weird] {
            state = visit(&engine, state, slot);
        }
        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Moved);
        assert_eq!(t.state.slide_index(), 1);
    }

    #[test]
    fn visits_on_one_slide_do_not_open_another() {
        let engine = engine_for(vec![
            gated_slide(&[SideSlot::Loop]),
            gated_slide(&[SideSlot::Loop]),
            Slide::solo(),
        ]);
        let mut player = Player::new();
        let state = visit(&engine, start(&engine, &mut player), SideSlot::Loop);
        let state = engine.advance(state, &mut player.ports()).state;
        assert_eq!(state.slide_index(), 1);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(
            t.outcome,
            Outcome::Blocked(Blocker::MissingSidePaths(vec![SideSlot::Loop]))
        );
    }

    #[test]
    fn advance_is_blocked_inside_a_side_path() {
        let engine = engine_for(vec![gated_slide(&[]), Slide::solo()]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);
        let state = engine.enter_side_path(state, SideSlot::Weird).state;

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(
            t.outcome,
            Outcome::Blocked(Blocker::InSidePath(SideSlot::Weird))
        );
    }

    #[test]
    fn undefined_side_path_is_a_no_op() {
        let slide = Slide::new(SlideKind::Advance(
            AdvanceSlide::new().with_loop(Panel::new(Payload::text("loop"))),
        ));
        let engine = engine_for(vec![slide]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.enter_side_path(state, SideSlot::Quest);
        assert_eq!(t.outcome, Outcome::Unchanged);
        assert!(!t.state.has_visited(SideSlot::Quest));
        assert_eq!(t.state.side_path(), None);
    }

    #[test]
    fn final_slide_portals_into_next_chapter() {
        let script = Script::new("ch1")
            .with_chapter(
                Chapter::new("ch1")
                    .with_slide(Slide::solo())
                    .with_slide(Slide::solo().with_next_chapter("ch2")),
            )
            .with_chapter(Chapter::new("ch2").with_slide(Slide::solo()));
        let engine = Engine::new(script);
        let mut player = Player::new();
        let state = start(&engine, &mut player);
        let state = engine.advance(state, &mut player.ports()).state;

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::ChapterStarted(ChapterId::new("ch2")));
        assert_eq!(t.state.chapter_id(), &ChapterId::new("ch2"));
        assert_eq!(t.state.slide_index(), 0);
        assert!(player.unlocks.is_unlocked(&ChapterId::new("ch2")));
        assert!(t.events.contains(&EngineEvent::ChapterUnlocked(ChapterId::new("ch2"))));
    }

    #[test]
    fn portal_into_unknown_chapter_stays_put() {
        let engine = engine_for(vec![Slide::solo().with_next_chapter("nowhere")]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Unchanged);
        assert_eq!(t.state.chapter_id(), &ChapterId::new("ch1"));
        assert_eq!(player.unlocks.unlocked().len(), 1);
    }

    #[test]
    fn last_slide_completes_the_chapter_and_runs_on_finish() {
        let finished = Rc::new(Cell::new(0));
        let counter = Rc::clone(&finished);
        let script = Script::new("ch1").with_chapter(
            Chapter::new("ch1")
                .with_slide(Slide::solo())
                .with_on_finish("done"),
        );
        let hooks = HookRegistry::new().with("done", move |_| {
            counter.set(counter.get() + 1);
            Ok(HookOutcome::Continue)
        });
        let engine = Engine::new(script).with_hooks(hooks);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert!(t.is_chapter_complete());
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn grants_apply_on_advance() {
        let engine = engine_for(vec![
            Slide::solo()
                .with_grant(Grant::item("badge"))
                .with_grant(Grant::currency(5)),
            Slide::solo().with_grant(Grant::currency(5)),
            Slide::solo(),
        ]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);
        let state = engine.advance(state, &mut player.ports()).state;
        engine.advance(state, &mut player.ports());

        assert!(player.inventory.has_item(&ItemId::new("badge")));
        assert_eq!(player.inventory.currency(), 10);
    }

    fn forge_slide() -> Slide {
        Slide::solo()
            .with_id("forge")
            .with_craft(Recipe::new(["ore", "coal", "flux"], "sword"))
    }

    #[test]
    fn forge_with_missing_prerequisite_changes_nothing() {
        let engine = engine_for(vec![forge_slide(), Slide::solo()]);
        let mut player = Player::new();
        player.hold(&["ore", "coal"]);
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Moved);
        assert!(player.inventory.has_item(&ItemId::new("ore")));
        assert!(player.inventory.has_item(&ItemId::new("coal")));
        assert!(!player.inventory.has_item(&ItemId::new("sword")));
        assert!(!t
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::PrerequisitesHeld { .. })));
    }

    #[test]
    fn forge_celebrates_only_when_crafting() {
        let engine = engine_for(vec![forge_slide(), Slide::solo()]);
        let mut player = Player::new();
        player.hold(&["ore", "coal", "flux"]);
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert!(t.events.contains(&EngineEvent::PrerequisitesHeld {
            produces: ItemId::new("sword")
        }));
        assert_eq!(player.inventory.quantity(&ItemId::new("sword")), 1);

        player.hold(&["ore", "coal", "flux"]);
        let state = engine.goto_slide_by_id(t.state, "forge", &mut player.ports()).state;
        let t = engine.advance(state, &mut player.ports());
        assert!(!t
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::PrerequisitesHeld { .. })));
        assert_eq!(player.inventory.quantity(&ItemId::new("sword")), 1);
        assert!(player.inventory.has_item(&ItemId::new("ore")));
    }

    #[test]
    fn every_visit_policy_celebrates_on_entry() {
        let engine = engine_for(vec![forge_slide(), Slide::solo()]).with_config(
            EngineConfig::default().with_celebration(CelebrationPolicy::EveryVisit),
        );
        let mut player = Player::new();
        player.hold(&["ore", "coal", "flux"]);

        let t = engine
            .start_chapter(&ChapterId::new("ch1"), &mut player.ports())
            .unwrap();
        assert!(t.events.contains(&EngineEvent::PrerequisitesHeld {
            produces: ItemId::new("sword")
        }));
    }

    #[test]
    fn handled_on_advance_stops_the_transition() {
        let engine = engine_for(vec![
            Slide::solo()
                .with_grant(Grant::currency(1))
                .with_on_advance("own"),
            Slide::solo(),
        ])
        .with_hooks(HookRegistry::new().with("own", |_| Ok(HookOutcome::Handled)));
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Handled);
        assert_eq!(t.state.slide_index(), 0);
        assert_eq!(player.inventory.currency(), 1);
    }

    #[test]
    fn failing_hook_falls_back_to_default_transition() {
        let engine = engine_for(vec![Slide::solo().with_on_advance("boom"), Slide::solo()])
            .with_hooks(HookRegistry::new().with("boom", |ctx| {
                ctx.jump_to(SlideId::new("nowhere"));
                Err(HookError::new("exploded"))
            }));
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::Moved);
        assert_eq!(t.state.slide_index(), 1);
    }

    #[test]
    fn unregistered_hook_is_not_handled() {
        let engine = engine_for(vec![Slide::solo().with_on_advance("ghost"), Slide::solo()]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);
        assert_eq!(engine.advance(state, &mut player.ports()).state.slide_index(), 1);
    }

    #[test]
    fn hook_can_jump_and_portal() {
        let script = Script::new("ch1")
            .with_chapter(
                Chapter::new("ch1")
                    .with_slide(Slide::solo().with_on_advance("skip"))
                    .with_slide(Slide::solo())
                    .with_slide(Slide::solo().with_id("end").with_on_advance("away")),
            )
            .with_chapter(Chapter::new("secret").with_slide(Slide::solo()));
        let hooks = HookRegistry::new()
            .with("skip", |ctx| {
                ctx.jump_to(SlideId::new("end"));
                Ok(HookOutcome::Continue)
            })
            .with("away", |ctx| {
                ctx.open_chapter(ChapterId::new("secret"));
                Ok(HookOutcome::Handled)
            });
        let engine = Engine::new(script).with_hooks(hooks);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        assert_eq!(t.state.slide_index(), 2);

        let t = engine.advance(t.state, &mut player.ports());
        assert_eq!(t.outcome, Outcome::ChapterStarted(ChapterId::new("secret")));
        assert!(player.unlocks.is_unlocked(&ChapterId::new("secret")));
    }

    #[test]
    fn on_enter_redirects_are_bounded() {
        let engine = engine_for(vec![
            Slide::solo(),
            Slide::solo().with_id("a").with_on_enter("to_b"),
            Slide::solo().with_id("b").with_on_enter("to_a"),
        ])
        .with_hooks(
            HookRegistry::new()
                .with("to_b", |ctx| {
                    ctx.jump_to(SlideId::new("b"));
                    Ok(HookOutcome::Continue)
                })
                .with("to_a", |ctx| {
                    ctx.jump_to(SlideId::new("a"));
                    Ok(HookOutcome::Continue)
                }),
        )
        .with_config(EngineConfig::default().with_max_redirects(3));
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.advance(state, &mut player.ports());
        let entered = t
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::SlideEntered { .. }))
            .count();
        assert_eq!(entered, 4);
        assert_eq!(t.state.slide_index(), 2);
    }

    #[test]
    fn goto_unknown_slide_is_a_no_op() {
        let engine = engine_for(vec![Slide::solo(), Slide::solo().with_id("known")]);
        let mut player = Player::new();
        let state = start(&engine, &mut player);

        let t = engine.goto_slide_by_id(state, "unknown", &mut player.ports());
        assert_eq!(t.outcome, Outcome::Unchanged);
        let t = engine.goto_slide_by_id(t.state, "known", &mut player.ports());
        assert_eq!(t.state.slide_index(), 1);
    }

    #[test]
    fn starting_unknown_or_empty_chapter_fails() {
        let script = Script::new("ch1")
            .with_chapter(Chapter::new("ch1").with_slide(Slide::solo()))
            .with_chapter(Chapter::new("blank"));
        let engine = Engine::new(script);
        let mut player = Player::new();

        assert!(matches!(
            engine.start_chapter(&ChapterId::new("ch9"), &mut player.ports()),
            Err(EngineError::UnknownChapter(_))
        ));
        assert!(matches!(
            engine.start_chapter(&ChapterId::new("blank"), &mut player.ports()),
            Err(EngineError::EmptyChapter(_))
        ));
    }

    #[test]
    fn broken_profile_never_blocks_progress() {
        let engine = engine_for(vec![
            Slide::solo().with_grant(Grant::item("key")),
            Slide::solo().with_craft(Recipe::new(["key"], "door")),
            Slide::solo(),
        ]);
        let mut profile = FailingProfile;
        let mut player = Player::new();
        let mut ports = Ports::new(&mut profile, &mut player.unlocks);

        let state = engine
            .start_chapter(&ChapterId::new("ch1"), &mut ports)
            .unwrap()
            .state;
        let state = engine.advance(state, &mut ports).state;
        let state = engine.advance(state, &mut ports).state;
        assert_eq!(state.slide_index(), 2);
    }

    proptest! {
        #[test]
        fn advance_moves_iff_required_slots_visited(
            required in proptest::sample::subsequence(SideSlot::ALL.to_vec(), 0..=3),
            visited in proptest::sample::subsequence(SideSlot::ALL.to_vec(), 0..=3),
        ) {
            let engine = engine_for(vec![gated_slide(&required), Slide::solo()]);
            let mut player = Player::new();
            let mut state = start(&engine, &mut player);
            for slot in &visited {
                state = visit(&engine, state, *slot);
            }

            let t = engine.advance(state, &mut player.ports());
            let satisfied = required.iter().all(|slot| visited.contains(slot));
            prop_assert_eq!(t.state.slide_index() == 1, satisfied);
            prop_assert_eq!(t.is_blocked(), !satisfied);
        }
    }
}
