//! Quests run inside a slide's `quest` side-path.

use serde::{Deserialize, Serialize};

use crate::grant::Grant;
use crate::id::HookId;
use crate::payload::Payload;

/// An ordered list of steps walked one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Steps in order.
    pub steps: Vec<QuestStep>,
    /// Default reveal gate for steps that do not set their own.
    #[serde(default)]
    pub require_reveal_to_advance: bool,
    /// Granted once, the first time the last step is passed.
    #[serde(default)]
    pub completion_reward: Vec<Grant>,
    /// Hook invoked when the quest is completed.
    #[serde(default)]
    pub on_complete: Option<HookId>,
}

impl Quest {
    /// Create an empty quest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn with_step(mut self, step: QuestStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Gate every step behind its reveal unless the step overrides it.
    pub fn gated(mut self) -> Self {
        self.require_reveal_to_advance = true;
        self
    }

    /// Add a completion reward.
    pub fn with_completion_reward(mut self, grant: Grant) -> Self {
        self.completion_reward.push(grant);
        self
    }

    /// Set the completion hook.
    pub fn with_on_complete(mut self, hook: impl Into<HookId>) -> Self {
        self.on_complete = Some(hook.into());
        self
    }

    /// Whether the step at `index` must be revealed before moving on.
    pub fn step_requires_reveal(&self, index: usize) -> bool {
        self.steps
            .get(index)
            .and_then(|step| step.require_reveal_to_advance)
            .unwrap_or(self.require_reveal_to_advance)
    }

    /// Index of the final step, or `None` for a quest with no steps.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }
}

/// One step of a [`Quest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestStep {
    /// Presentation data for the step.
    #[serde(default)]
    pub content: Payload,
    /// Data disclosed by the reveal action.
    #[serde(default)]
    pub reveal: Option<Payload>,
    /// Granted when the step is revealed.
    #[serde(default)]
    pub reward: Vec<Grant>,
    /// Step-level override of the quest's reveal gate.
    #[serde(default)]
    pub require_reveal_to_advance: Option<bool>,
}

impl QuestStep {
    /// Create a step with the given content.
    pub fn new(content: Payload) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Set the reveal payload.
    pub fn with_reveal(mut self, reveal: Payload) -> Self {
        self.reveal = Some(reveal);
        self
    }

    /// Add a reveal reward.
    pub fn with_reward(mut self, grant: Grant) -> Self {
        self.reward.push(grant);
        self
    }

    /// Override the quest-level reveal gate for this step.
    pub fn requiring_reveal(mut self, required: bool) -> Self {
        self.require_reveal_to_advance = Some(required);
        self
    }
}
