//! The player profile: inventory, wallet, and persistence.
//!
//! [`PlayerProfile`] is the narrow API the engine talks to. The profile
//! itself is a plain inventory: adding an item that is already held raises
//! its quantity. Idempotent narrative grants are layered on top by the
//! [`Ledger`](crate::Ledger).

use std::collections::BTreeMap;

use saga_core::{ItemId, Payload};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::StorageKeys;
use crate::error::ProfileResult;
use crate::storage::Storage;

/// The operations the engine may perform on a player's durable state.
pub trait PlayerProfile {
    /// Whether at least one unit of the item is held.
    fn has_item(&self, id: &ItemId) -> bool;

    /// Add one unit of an item. The payload is kept from the first add.
    fn add_item(&mut self, id: &ItemId, payload: Payload) -> ProfileResult<()>;

    /// Remove one unit of an item. Returns whether anything was removed.
    fn remove_item(&mut self, id: &ItemId) -> ProfileResult<bool>;

    /// Remove one unit of each listed item that is held; missing ids are
    /// skipped. Returns the ids actually removed.
    fn consume_items(&mut self, ids: &[ItemId]) -> ProfileResult<Vec<ItemId>> {
        let mut consumed = Vec::new();
        for id in ids {
            if self.remove_item(id)? {
                consumed.push(id.clone());
            }
        }
        Ok(consumed)
    }

    /// Add currency to the wallet.
    fn add_currency(&mut self, amount: u64) -> ProfileResult<()>;

    /// Current wallet balance.
    fn currency(&self) -> u64;

    /// Every held item, ordered by id.
    fn list_items(&self) -> Vec<InventoryItem>;

    /// Flush the profile to durable storage.
    fn save_to_storage(&mut self) -> ProfileResult<()>;
}

/// A held item as reported by [`PlayerProfile::list_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    /// Item identifier.
    pub id: ItemId,
    /// Units held.
    pub qty: u32,
    /// Presentation data.
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    qty: u32,
    #[serde(default)]
    payload: Payload,
}

/// An in-memory inventory and wallet.
///
/// Serializes as `{"items": {id: {"qty", "payload"}}, "wallet": n}`.
/// `save_to_storage` is a no-op; wrap it in a [`StoredProfile`] to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    items: BTreeMap<ItemId, Entry>,
    #[serde(default)]
    wallet: u64,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units held of an item.
    pub fn quantity(&self, id: &ItemId) -> u32 {
        self.items.get(id).map_or(0, |entry| entry.qty)
    }

    /// Number of distinct items held.
    pub fn distinct_items(&self) -> usize {
        self.items.len()
    }

    fn drop_empty_entries(&mut self) {
        self.items.retain(|_, entry| entry.qty > 0);
    }
}

impl PlayerProfile for Inventory {
    fn has_item(&self, id: &ItemId) -> bool {
        self.quantity(id) > 0
    }

    fn add_item(&mut self, id: &ItemId, payload: Payload) -> ProfileResult<()> {
        self.items
            .entry(id.clone())
            .and_modify(|entry| entry.qty = entry.qty.saturating_add(1))
            .or_insert(Entry { qty: 1, payload });
        Ok(())
    }

    fn remove_item(&mut self, id: &ItemId) -> ProfileResult<bool> {
        let Some(entry) = self.items.get_mut(id) else {
            return Ok(false);
        };
        let Some(left) = entry.qty.checked_sub(1) else {
            self.items.remove(id);
            return Ok(false);
        };
        entry.qty = left;
        if left == 0 {
            self.items.remove(id);
        }
        Ok(true)
    }

    fn add_currency(&mut self, amount: u64) -> ProfileResult<()> {
        self.wallet = self.wallet.saturating_add(amount);
        Ok(())
    }

    fn currency(&self) -> u64 {
        self.wallet
    }

    fn list_items(&self) -> Vec<InventoryItem> {
        self.items
            .iter()
            .map(|(id, entry)| InventoryItem {
                id: id.clone(),
                qty: entry.qty,
                payload: entry.payload.clone(),
            })
            .collect()
    }

    fn save_to_storage(&mut self) -> ProfileResult<()> {
        Ok(())
    }
}

/// An [`Inventory`] persisted as JSON through a [`Storage`] backend.
#[derive(Debug)]
pub struct StoredProfile<S: Storage> {
    inventory: Inventory,
    storage: S,
    key: String,
}

impl<S: Storage> StoredProfile<S> {
    /// Load the profile stored under `keys.profile`.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty profile.
    pub fn load(storage: S, keys: &StorageKeys) -> Self {
        let mut inventory = match storage.get(&keys.profile) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key = %keys.profile, error = %e, "malformed profile snapshot, starting empty");
                Inventory::new()
            }),
            Ok(None) => Inventory::new(),
            Err(e) => {
                warn!(key = %keys.profile, error = %e, "cannot read profile, starting empty");
                Inventory::new()
            }
        };
        inventory.drop_empty_entries();
        Self {
            inventory,
            storage,
            key: keys.profile.clone(),
        }
    }

    /// The in-memory inventory.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> PlayerProfile for StoredProfile<S> {
    fn has_item(&self, id: &ItemId) -> bool {
        self.inventory.has_item(id)
    }

    fn add_item(&mut self, id: &ItemId, payload: Payload) -> ProfileResult<()> {
        self.inventory.add_item(id, payload)
    }

    fn remove_item(&mut self, id: &ItemId) -> ProfileResult<bool> {
        self.inventory.remove_item(id)
    }

    fn add_currency(&mut self, amount: u64) -> ProfileResult<()> {
        self.inventory.add_currency(amount)
    }

    fn currency(&self) -> u64 {
        self.inventory.currency()
    }

    fn list_items(&self) -> Vec<InventoryItem> {
        self.inventory.list_items()
    }

    fn save_to_storage(&mut self) -> ProfileResult<()> {
        let raw = serde_json::to_string(&self.inventory).map_err(crate::StorageError::from)?;
        self.storage.set(&self.key, &raw)?;
        Ok(())
    }
}
