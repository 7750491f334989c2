//! Fixtures shared by the engine's unit tests.

use saga_core::{Chapter, ChapterId, ItemId, Payload, Script, Slide};
use saga_profile::{
    Inventory, InventoryItem, MemoryStorage, PlayerProfile, ProfileError, ProfileResult,
    StorageError, StorageKeys, UnlockStore,
};

use crate::controller::{Engine, Ports};
use crate::state::EngineState;

/// A player with an in-memory inventory and unlock set, starting at `ch1`.
pub(crate) struct Player {
    pub inventory: Inventory,
    pub unlocks: UnlockStore<MemoryStorage>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            inventory: Inventory::new(),
            unlocks: UnlockStore::open(
                MemoryStorage::new(),
                &StorageKeys::default(),
                &ChapterId::new("ch1"),
            ),
        }
    }

    pub fn ports(&mut self) -> Ports<'_> {
        Ports::new(&mut self.inventory, &mut self.unlocks)
    }

    pub fn hold(&mut self, items: &[&str]) {
        for item in items {
            self.inventory
                .add_item(&ItemId::new(*item), Payload::new())
                .unwrap();
        }
    }
}

/// A profile whose every write fails.
pub(crate) struct FailingProfile;

fn refuse() -> ProfileError {
    ProfileError::Storage(StorageError::Unavailable("offline".into()))
}

impl PlayerProfile for FailingProfile {
    fn has_item(&self, _id: &ItemId) -> bool {
        false
    }
    fn add_item(&mut self, _id: &ItemId, _payload: Payload) -> ProfileResult<()> {
        Err(refuse())
    }
    fn remove_item(&mut self, _id: &ItemId) -> ProfileResult<bool> {
        Err(refuse())
    }
    fn add_currency(&mut self, _amount: u64) -> ProfileResult<()> {
        Err(refuse())
    }
    fn currency(&self) -> u64 {
        0
    }
    fn list_items(&self) -> Vec<InventoryItem> {
        Vec::new()
    }
    fn save_to_storage(&mut self) -> ProfileResult<()> {
        Err(refuse())
    }
}

/// An engine over a single chapter `ch1`.
pub(crate) fn engine_for(slides: Vec<Slide>) -> Engine {
    let chapter = slides
        .into_iter()
        .fold(Chapter::new("ch1"), |chapter, slide| chapter.with_slide(slide));
    Engine::new(Script::new("ch1").with_chapter(chapter))
}

/// Start `ch1` and return the fresh state.
pub(crate) fn start(engine: &Engine, player: &mut Player) -> EngineState {
    engine
        .start_chapter(&ChapterId::new("ch1"), &mut player.ports())
        .unwrap()
        .state
}
