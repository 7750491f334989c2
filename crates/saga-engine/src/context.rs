//! The capability interface hooks run against.
//!
//! Hooks never see the engine, the state, or the raw profile. They can grant
//! rewards, inspect the inventory, read the selected choice, and ask for a
//! jump or a chapter portal that the engine carries out once the hook
//! returns.

use saga_core::{ChapterId, ChoiceOption, ItemId, Payload, SlideId};
use saga_profile::{Ledger, LedgerEvent};

/// What a hook may do during a transition.
pub trait TransitionContext {
    /// Grant an item unless already held. Returns whether it was new.
    fn grant_item(&mut self, id: &ItemId, payload: Payload) -> bool;

    /// Add currency to the wallet.
    fn grant_currency(&mut self, amount: u64);

    /// Whether the player holds an item.
    fn has_item(&self, id: &ItemId) -> bool;

    /// Current wallet balance.
    fn currency(&self) -> u64;

    /// Ask the engine to jump to a slide of the current chapter.
    fn jump_to(&mut self, slide: SlideId);

    /// Ask the engine to finish the current chapter and start another.
    fn open_chapter(&mut self, chapter: ChapterId);

    /// The option selected on the current choice slide, if any.
    fn choice(&self) -> Option<&ChoiceOption>;

    /// The chapter being traversed.
    fn chapter_id(&self) -> &ChapterId;

    /// Index of the current slide.
    fn slide_index(&self) -> usize;
}

/// Navigation requested by a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HookRequest {
    JumpTo(SlideId),
    OpenChapter(ChapterId),
}

/// The engine's [`TransitionContext`]: a ledger plus navigation requests.
pub(crate) struct HookContext<'a> {
    ledger: Ledger<'a>,
    chapter_id: &'a ChapterId,
    slide_index: usize,
    choice: Option<&'a ChoiceOption>,
    request: Option<HookRequest>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(
        ledger: Ledger<'a>,
        chapter_id: &'a ChapterId,
        slide_index: usize,
        choice: Option<&'a ChoiceOption>,
    ) -> Self {
        Self {
            ledger,
            chapter_id,
            slide_index,
            choice,
            request: None,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<LedgerEvent>, Option<HookRequest>) {
        (self.ledger.into_events(), self.request)
    }
}

impl TransitionContext for HookContext<'_> {
    fn grant_item(&mut self, id: &ItemId, payload: Payload) -> bool {
        self.ledger.grant_item(id, payload)
    }

    fn grant_currency(&mut self, amount: u64) {
        self.ledger.grant_currency(amount);
    }

    fn has_item(&self, id: &ItemId) -> bool {
        self.ledger.has_item(id)
    }

    fn currency(&self) -> u64 {
        self.ledger.currency()
    }

    // Last request wins.
    fn jump_to(&mut self, slide: SlideId) {
        self.request = Some(HookRequest::JumpTo(slide));
    }

    fn open_chapter(&mut self, chapter: ChapterId) {
        self.request = Some(HookRequest::OpenChapter(chapter));
    }

    fn choice(&self) -> Option<&ChoiceOption> {
        self.choice
    }

    fn chapter_id(&self) -> &ChapterId {
        self.chapter_id
    }

    fn slide_index(&self) -> usize {
        self.slide_index
    }
}
