//! Storage key configuration.

use serde::{Deserialize, Serialize};

/// Keys under which player state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key of the unlocked-chapter array.
    pub unlocks: String,
    /// Key of the profile snapshot.
    pub profile: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            unlocks: "unlocked_chapters".to_string(),
            profile: "player_profile".to_string(),
        }
    }
}

impl StorageKeys {
    /// Set the unlock key.
    pub fn with_unlocks(mut self, key: impl Into<String>) -> Self {
        self.unlocks = key.into();
        self
    }

    /// Set the profile key.
    pub fn with_profile(mut self, key: impl Into<String>) -> Self {
        self.profile = key.into();
        self
    }
}
