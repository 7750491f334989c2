//! Chapter navigation engine for Saga.
//!
//! The [`Engine`] is a pure transition function over [`EngineState`]: every
//! operation takes the current state by value and returns a [`Transition`]
//! holding the next state, what happened, and the events raised on the way.
//! Player-owned state (inventory, wallet, unlocked chapters) is reached only
//! through the [`Ports`] passed into each call.
//!
//! Slides are resolved by kind: plain advance slides with gated side-paths,
//! quests, choices, quizzes, the customer mini-flow, and endings. Hooks named
//! by the script are looked up in a [`HookRegistry`] and run against a narrow
//! [`TransitionContext`].

/// Engine configuration.
pub mod config;
/// Capability interface handed to hooks.
pub mod context;
/// The navigation and gating controller.
pub mod controller;
/// Error types.
pub mod error;
mod flow;
/// Hook registry.
pub mod hooks;
/// User intents and dispatch.
pub mod intent;
/// Per-traversal runtime state.
pub mod state;
/// Presentation view of the current slide.
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CelebrationPolicy, EngineConfig};
pub use context::TransitionContext;
pub use controller::{Blocker, Engine, EngineEvent, Outcome, Ports, Transition};
pub use error::{EngineError, EngineResult, HookError};
pub use hooks::{HookOutcome, HookRegistry};
pub use intent::Intent;
pub use state::{EngineState, SlideKey};
pub use view::{CustomerView, PanelView, Presenter, QuestView, SidePathStatus, SlideView};
