//! Hooks referenced by name from script data.
//!
//! Scripts stay pure data: a slide names its `on_enter`, `on_advance` or
//! `on_select` hook by [`HookId`], and the host registers the matching
//! closures here before play.

use std::collections::HashMap;
use std::fmt;

use saga_core::HookId;
use tracing::warn;

use crate::context::TransitionContext;
use crate::error::HookError;

/// What a hook tells the engine after it ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HookOutcome {
    /// Carry on with the default transition.
    #[default]
    Continue,
    /// The hook fully owned the transition; the engine stops here.
    Handled,
}

type Hook = Box<dyn Fn(&mut dyn TransitionContext) -> Result<HookOutcome, HookError>>;

/// Named hooks available to a script.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookId, Hook>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook, replacing any previous hook with the same id.
    pub fn register(
        &mut self,
        id: impl Into<HookId>,
        hook: impl Fn(&mut dyn TransitionContext) -> Result<HookOutcome, HookError> + 'static,
    ) {
        self.hooks.insert(id.into(), Box::new(hook));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(
        mut self,
        id: impl Into<HookId>,
        hook: impl Fn(&mut dyn TransitionContext) -> Result<HookOutcome, HookError> + 'static,
    ) -> Self {
        self.register(id, hook);
        self
    }

    /// Whether a hook is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.hooks.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&HookId> {
        let mut ids: Vec<&HookId> = self.hooks.keys().collect();
        ids.sort();
        ids
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run a hook. Returns `None` when the hook is missing or failed; both
    /// are logged and must be treated as "not handled".
    pub(crate) fn invoke(&self, id: &HookId, ctx: &mut dyn TransitionContext) -> Option<HookOutcome> {
        let Some(hook) = self.hooks.get(id) else {
            warn!(hook = %id, "hook is not registered");
            return None;
        };
        match hook(ctx) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(hook = %id, error = %e, "hook failed");
                None
            }
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}
