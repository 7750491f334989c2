//! Player-owned state for Saga.
//!
//! Everything here outlives a single chapter traversal: the player's
//! inventory and wallet, the rules for granting and crafting items, and the
//! persisted set of unlocked chapters. Persistence goes through the
//! [`Storage`] port so tests can run against [`MemoryStorage`].

pub mod config;
pub mod error;
pub mod ledger;
pub mod profile;
pub mod storage;
pub mod unlocks;

pub use config::StorageKeys;
pub use error::{ProfileError, ProfileResult, StorageError, StorageResult};
pub use ledger::{CraftOutcome, Ledger, LedgerEvent};
pub use profile::{Inventory, InventoryItem, PlayerProfile, StoredProfile};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageListener};
pub use unlocks::{ChapterUnlocks, UnlockStore};
