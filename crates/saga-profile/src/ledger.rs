//! Reward and inventory ledger.
//!
//! The ledger enforces the narrative reward rules on top of a
//! [`PlayerProfile`]: item grants are idempotent, currency is additive, and
//! crafting runs at most once per produced item. Every mutation is followed
//! by a profile flush. Profile failures are logged and swallowed so a broken
//! save never blocks the story.

use std::collections::BTreeMap;

use saga_core::{Grant, ItemId, Payload, Recipe};
use tracing::{debug, warn};

use crate::error::ProfileResult;
use crate::profile::{InventoryItem, PlayerProfile};

/// Something the ledger changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// An item was granted for the first time.
    ItemGranted {
        /// The granted item.
        id: ItemId,
    },
    /// Currency was added.
    CurrencyGranted {
        /// Amount added.
        amount: u64,
        /// Wallet balance afterwards.
        balance: u64,
    },
    /// Items were consumed outside of crafting.
    ItemsConsumed {
        /// Ids actually removed.
        ids: Vec<ItemId>,
    },
    /// A recipe was crafted.
    Crafted {
        /// The produced item.
        produces: ItemId,
        /// Prerequisites consumed.
        consumed: Vec<ItemId>,
    },
}

/// Result of [`Ledger::craft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftOutcome {
    /// Prerequisites were consumed and the item granted.
    Crafted,
    /// The produced item is already held; nothing changed.
    AlreadyCrafted,
    /// Some prerequisites are missing; nothing changed.
    MissingPrerequisites(Vec<ItemId>),
    /// The profile failed part-way; see the log.
    Failed,
}

/// Applies grants, consumption and crafting to a player profile.
pub struct Ledger<'a> {
    profile: &'a mut dyn PlayerProfile,
    events: Vec<LedgerEvent>,
}

impl<'a> Ledger<'a> {
    /// Wrap a profile.
    pub fn new(profile: &'a mut dyn PlayerProfile) -> Self {
        Self {
            profile,
            events: Vec::new(),
        }
    }

    /// Whether the item is held.
    pub fn has_item(&self, id: &ItemId) -> bool {
        self.profile.has_item(id)
    }

    /// Current wallet balance.
    pub fn currency(&self) -> u64 {
        self.profile.currency()
    }

    /// Grant an item unless it is already held. Returns whether it was new.
    pub fn grant_item(&mut self, id: &ItemId, payload: Payload) -> bool {
        if self.profile.has_item(id) {
            return false;
        }
        if !succeeded(self.profile.add_item(id, payload), "grant item") {
            return false;
        }
        debug!(item = %id, "item granted");
        self.events.push(LedgerEvent::ItemGranted { id: id.clone() });
        self.flush();
        true
    }

    /// Add currency to the wallet. Zero amounts are ignored.
    pub fn grant_currency(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        if !succeeded(self.profile.add_currency(amount), "grant currency") {
            return;
        }
        let balance = self.profile.currency();
        debug!(amount, balance, "currency granted");
        self.events
            .push(LedgerEvent::CurrencyGranted { amount, balance });
        self.flush();
    }

    /// Apply a list of grants in order.
    pub fn apply(&mut self, grants: &[Grant]) {
        for grant in grants {
            match grant {
                Grant::Item(item) => {
                    self.grant_item(&item.id, item.payload.clone());
                }
                Grant::Currency(amount) => self.grant_currency(*amount),
            }
        }
    }

    /// Remove one unit of each held id. Missing ids are skipped.
    pub fn consume(&mut self, ids: &[ItemId]) -> Vec<ItemId> {
        let consumed = match self.profile.consume_items(ids) {
            Ok(consumed) => consumed,
            Err(e) => {
                warn!(error = %e, "failed to consume items");
                return Vec::new();
            }
        };
        if !consumed.is_empty() {
            self.events.push(LedgerEvent::ItemsConsumed {
                ids: consumed.clone(),
            });
            self.flush();
        }
        consumed
    }

    /// Whether every prerequisite of the recipe is currently held.
    pub fn prerequisites_held(&self, recipe: &Recipe) -> bool {
        self.missing_prerequisites(recipe).is_empty()
    }

    /// Required ids held in fewer units than the recipe lists them,
    /// in recipe order.
    pub fn missing_prerequisites(&self, recipe: &Recipe) -> Vec<ItemId> {
        let held: BTreeMap<ItemId, u32> = self
            .profile
            .list_items()
            .into_iter()
            .map(|item| (item.id, item.qty))
            .collect();
        let mut needed: BTreeMap<&ItemId, u32> = BTreeMap::new();
        for id in &recipe.requires {
            *needed.entry(id).or_default() += 1;
        }

        let mut missing = Vec::new();
        for id in &recipe.requires {
            let short = needed.remove(id).is_some_and(|units| {
                units > held.get(id).copied().unwrap_or_default()
            });
            if short {
                missing.push(id.clone());
            }
        }
        missing
    }

    /// Craft a recipe.
    ///
    /// If the produced item is already held nothing happens. If any
    /// prerequisite is missing nothing is consumed; an id listed twice needs
    /// two units. If the product cannot be granted the consumed
    /// prerequisites are put back.
    pub fn craft(&mut self, recipe: &Recipe) -> CraftOutcome {
        if self.profile.has_item(&recipe.produces) {
            return CraftOutcome::AlreadyCrafted;
        }
        let missing = self.missing_prerequisites(recipe);
        if !missing.is_empty() {
            debug!(produces = %recipe.produces, ?missing, "craft skipped");
            return CraftOutcome::MissingPrerequisites(missing);
        }

        let held = self.profile.list_items();
        let consumed = match self.profile.consume_items(&recipe.requires) {
            Ok(consumed) => consumed,
            Err(e) => {
                warn!(produces = %recipe.produces, error = %e, "craft failed while consuming");
                self.flush();
                return CraftOutcome::Failed;
            }
        };
        if let Err(e) = self.profile.add_item(&recipe.produces, recipe.payload.clone()) {
            warn!(produces = %recipe.produces, error = %e, "failed to grant crafted item, restoring prerequisites");
            self.restore(&consumed, &held);
            self.flush();
            return CraftOutcome::Failed;
        }
        debug!(produces = %recipe.produces, "crafted");
        self.events.push(LedgerEvent::Crafted {
            produces: recipe.produces.clone(),
            consumed,
        });
        self.flush();
        CraftOutcome::Crafted
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Consume the ledger, returning its events.
    pub fn into_events(self) -> Vec<LedgerEvent> {
        self.events
    }

    fn restore(&mut self, consumed: &[ItemId], held: &[InventoryItem]) {
        let mut lost = Vec::new();
        for id in consumed {
            let payload = held
                .iter()
                .find(|item| &item.id == id)
                .map_or_else(Payload::new, |item| item.payload.clone());
            if self.profile.add_item(id, payload).is_err() {
                lost.push(id.clone());
            }
        }
        if !lost.is_empty() {
            warn!(?lost, "prerequisites lost after a failed craft");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.profile.save_to_storage() {
            warn!(error = %e, "failed to save profile");
        }
    }
}

fn succeeded(result: ProfileResult<()>, action: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to {action}");
            false
        }
    }
}

impl std::fmt::Debug for Ledger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProfileError, StorageError};
    use crate::profile::{Inventory, InventoryItem};
    use proptest::prelude::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    /// Counts flushes and can be told to fail every save or to refuse one
    /// item.
    #[derive(Default)]
    struct CountingProfile {
        inner: Inventory,
        saves: usize,
        fail_saves: bool,
        refuse: Option<ItemId>,
    }

    impl PlayerProfile for CountingProfile {
        fn has_item(&self, id: &ItemId) -> bool {
            self.inner.has_item(id)
        }
        fn add_item(&mut self, id: &ItemId, payload: Payload) -> ProfileResult<()> {
            if self.refuse.as_ref() == Some(id) {
                return Err(ProfileError::Rejected(format!("no room for {id}")));
            }
            self.inner.add_item(id, payload)
        }
        fn remove_item(&mut self, id: &ItemId) -> ProfileResult<bool> {
            self.inner.remove_item(id)
        }
        fn add_currency(&mut self, amount: u64) -> ProfileResult<()> {
            self.inner.add_currency(amount)
        }
        fn currency(&self) -> u64 {
            self.inner.currency()
        }
        fn list_items(&self) -> Vec<InventoryItem> {
            self.inner.list_items()
        }
        fn save_to_storage(&mut self) -> ProfileResult<()> {
            self.saves += 1;
            if self.fail_saves {
                return Err(ProfileError::Storage(StorageError::Unavailable(
                    "disk full".into(),
                )));
            }
            Ok(())
        }
    }

    fn forge() -> Recipe {
        Recipe::new(["ore", "coal", "flux"], "sword")
    }

    #[test]
    fn item_grants_are_idempotent() {
        let mut inv = Inventory::new();
        let mut ledger = Ledger::new(&mut inv);
        assert!(ledger.grant_item(&id("key"), Payload::new()));
        assert!(!ledger.grant_item(&id("key"), Payload::new()));
        assert_eq!(ledger.events().len(), 1);
        drop(ledger);

        assert_eq!(inv.quantity(&id("key")), 1);
    }

    #[test]
    fn currency_is_additive() {
        let mut inv = Inventory::new();
        let mut ledger = Ledger::new(&mut inv);
        ledger.apply(&[Grant::currency(5), Grant::currency(5)]);
        assert_eq!(ledger.currency(), 10);
        assert_eq!(
            ledger.events().last(),
            Some(&LedgerEvent::CurrencyGranted {
                amount: 5,
                balance: 10
            })
        );
    }

    #[test]
    fn craft_consumes_once_and_is_idempotent() {
        let mut inv = Inventory::new();
        let mut ledger = Ledger::new(&mut inv);
        ledger.apply(&[
            Grant::item("ore"),
            Grant::item("coal"),
            Grant::item("flux"),
        ]);

        assert_eq!(ledger.craft(&forge()), CraftOutcome::Crafted);
        assert_eq!(ledger.craft(&forge()), CraftOutcome::AlreadyCrafted);
        drop(ledger);

        assert_eq!(inv.quantity(&id("sword")), 1);
        for used in ["ore", "coal", "flux"] {
            assert!(!inv.has_item(&id(used)));
        }
    }

    #[test]
    fn craft_with_missing_prerequisite_changes_nothing() {
        let mut inv = Inventory::new();
        let mut ledger = Ledger::new(&mut inv);
        ledger.apply(&[Grant::item("ore"), Grant::item("coal")]);

        assert!(!ledger.prerequisites_held(&forge()));
        assert_eq!(
            ledger.craft(&forge()),
            CraftOutcome::MissingPrerequisites(vec![id("flux")])
        );
        drop(ledger);

        assert!(inv.has_item(&id("ore")));
        assert!(inv.has_item(&id("coal")));
        assert!(!inv.has_item(&id("sword")));
    }

    #[test]
    fn craft_counts_repeated_prerequisites() {
        let double = Recipe::new(["ore", "ore", "coal"], "ingot");
        let mut inv = Inventory::new();
        inv.add_item(&id("ore"), Payload::new()).unwrap();
        inv.add_item(&id("coal"), Payload::new()).unwrap();
        let mut ledger = Ledger::new(&mut inv);

        assert!(!ledger.prerequisites_held(&double));
        assert_eq!(
            ledger.craft(&double),
            CraftOutcome::MissingPrerequisites(vec![id("ore")])
        );
        drop(ledger);
        assert_eq!(inv.quantity(&id("ore")), 1);

        inv.add_item(&id("ore"), Payload::new()).unwrap();
        let mut ledger = Ledger::new(&mut inv);
        assert_eq!(ledger.craft(&double), CraftOutcome::Crafted);
        drop(ledger);
        assert!(!inv.has_item(&id("ore")));
        assert!(!inv.has_item(&id("coal")));
        assert!(inv.has_item(&id("ingot")));
    }

    #[test]
    fn failed_product_grant_restores_prerequisites() {
        let mut profile = CountingProfile {
            refuse: Some(id("sword")),
            ..Default::default()
        };
        for held in ["ore", "coal", "flux"] {
            profile.inner.add_item(&id(held), Payload::text(held)).unwrap();
        }
        let mut ledger = Ledger::new(&mut profile);

        assert_eq!(ledger.craft(&forge()), CraftOutcome::Failed);
        assert!(ledger.events().is_empty());
        assert!(ledger.prerequisites_held(&forge()));
        drop(ledger);

        assert!(!profile.inner.has_item(&id("sword")));
        let ore = profile
            .inner
            .list_items()
            .into_iter()
            .find(|item| item.id == id("ore"))
            .unwrap();
        assert_eq!(ore.payload.body(), Some("ore"));
        assert_eq!(profile.saves, 1);
    }

    #[test]
    fn consume_skips_missing() {
        let mut inv = Inventory::new();
        let mut ledger = Ledger::new(&mut inv);
        ledger.grant_item(&id("a"), Payload::new());
        assert_eq!(ledger.consume(&[id("a"), id("b")]), vec![id("a")]);
        assert!(ledger.consume(&[id("b")]).is_empty());
    }

    #[test]
    fn every_mutation_flushes() {
        let mut profile = CountingProfile::default();
        let mut ledger = Ledger::new(&mut profile);
        ledger.grant_item(&id("a"), Payload::new());
        ledger.grant_item(&id("a"), Payload::new());
        ledger.grant_currency(3);
        ledger.grant_currency(0);
        drop(ledger);
        assert_eq!(profile.saves, 2);
    }

    #[test]
    fn save_failures_do_not_undo_grants() {
        let mut profile = CountingProfile {
            fail_saves: true,
            ..Default::default()
        };
        let mut ledger = Ledger::new(&mut profile);
        assert!(ledger.grant_item(&id("a"), Payload::new()));
        ledger.grant_currency(4);
        assert!(ledger.has_item(&id("a")));
        assert_eq!(ledger.currency(), 4);
    }

    proptest! {
        #[test]
        fn repeated_item_grants_hold_one_unit(times in 1usize..10) {
            let mut inv = Inventory::new();
            let mut ledger = Ledger::new(&mut inv);
            for _ in 0..times {
                ledger.grant_item(&id("relic"), Payload::new());
            }
            prop_assert_eq!(ledger.events().len(), 1);
            drop(ledger);
            prop_assert_eq!(inv.quantity(&id("relic")), 1);
        }

        #[test]
        fn currency_sums(amounts in proptest::collection::vec(0u64..1_000, 0..20)) {
            let mut inv = Inventory::new();
            let mut ledger = Ledger::new(&mut inv);
            for amount in &amounts {
                ledger.grant_currency(*amount);
            }
            prop_assert_eq!(ledger.currency(), amounts.iter().sum::<u64>());
        }
    }
}
