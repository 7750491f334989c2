//! Persisted, monotonic set of unlocked chapters.
//!
//! The set is stored as a JSON array of chapter ids under
//! [`StorageKeys::unlocks`]. It always contains the first chapter and only
//! ever grows.

use std::fmt;

use saga_core::ChapterId;
use tracing::{debug, warn};

use crate::config::StorageKeys;
use crate::storage::Storage;

/// The operations the engine performs on the unlock set.
pub trait ChapterUnlocks {
    /// Whether a chapter may be entered.
    fn is_unlocked(&self, id: &ChapterId) -> bool;

    /// Add a chapter to the set. Returns whether the set changed.
    fn unlock(&mut self, id: &ChapterId) -> bool;

    /// Every unlocked chapter, in unlock order.
    fn unlocked(&self) -> Vec<ChapterId>;
}

type UnlockListener = Box<dyn FnMut(&[ChapterId])>;

/// An unlock set backed by a [`Storage`] port.
pub struct UnlockStore<S: Storage> {
    storage: S,
    key: String,
    chapters: Vec<ChapterId>,
    listeners: Vec<UnlockListener>,
}

impl<S: Storage> UnlockStore<S> {
    /// Load the unlock set, falling back to `[first]` when the stored value
    /// is absent, unreadable or malformed.
    pub fn open(storage: S, keys: &StorageKeys, first: &ChapterId) -> Self {
        let stored = match storage.get(&keys.unlocks) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<ChapterId>>(&raw)
                .map_err(|e| warn!(key = %keys.unlocks, error = %e, "malformed unlock set, using default"))
                .unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %keys.unlocks, error = %e, "cannot read unlock set, using default");
                Vec::new()
            }
        };

        let mut chapters = vec![first.clone()];
        for id in stored {
            if !chapters.contains(&id) {
                chapters.push(id);
            }
        }

        Self {
            storage,
            key: keys.unlocks.clone(),
            chapters,
            listeners: Vec::new(),
        }
    }

    /// Unlocked chapters, first chapter first.
    pub fn chapters(&self) -> &[ChapterId] {
        &self.chapters
    }

    /// Register a callback receiving the full set after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&[ChapterId]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.chapters) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "cannot encode unlock set");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &raw) {
            warn!(key = %self.key, error = %e, "failed to persist unlock set");
        }
    }
}

impl<S: Storage> ChapterUnlocks for UnlockStore<S> {
    fn is_unlocked(&self, id: &ChapterId) -> bool {
        self.chapters.contains(id)
    }

    fn unlock(&mut self, id: &ChapterId) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.chapters.push(id.clone());
        debug!(chapter = %id, "chapter unlocked");
        self.persist();
        for listener in &mut self.listeners {
            listener(self.chapters.as_slice());
        }
        true
    }

    fn unlocked(&self) -> Vec<ChapterId> {
        self.chapters.clone()
    }
}

impl<S: Storage + fmt::Debug> fmt::Debug for UnlockStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("chapters", &self.chapters)
            .finish_non_exhaustive()
    }
}
