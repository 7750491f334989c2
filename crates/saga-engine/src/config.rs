//! Engine configuration.

use serde::{Deserialize, Serialize};

/// When the "all prerequisites held" celebration fires for a crafting slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelebrationPolicy {
    /// Only on the transition that actually performs the craft.
    #[default]
    OnCraft,
    /// Every time the slide is entered while all prerequisites are held,
    /// whether or not the item was already crafted.
    EveryVisit,
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Celebration policy for crafting slides.
    pub celebration: CelebrationPolicy,
    /// Maximum number of hook-driven jumps followed in one transition.
    pub max_redirects: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            celebration: CelebrationPolicy::OnCraft,
            max_redirects: 8,
        }
    }
}

impl EngineConfig {
    /// Set the celebration policy.
    pub fn with_celebration(mut self, celebration: CelebrationPolicy) -> Self {
        self.celebration = celebration;
        self
    }

    /// Set the redirect limit.
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }
}
