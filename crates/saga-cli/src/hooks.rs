//! Hooks the terminal player provides to every script.

use saga_engine::{HookOutcome, HookRegistry};
use tracing::info;

/// Register the built-in hooks.
///
/// - `noop`: does nothing.
/// - `coin`: adds one unit of currency.
/// - `hold`: swallows the transition, so the player stays on the slide.
pub fn builtin_hooks() -> HookRegistry {
    HookRegistry::new()
        .with("noop", |_| Ok(HookOutcome::Continue))
        .with("coin", |ctx| {
            ctx.grant_currency(1);
            Ok(HookOutcome::Continue)
        })
        .with("hold", |ctx| {
            info!(chapter = %ctx.chapter_id(), slide = ctx.slide_index(), "transition held");
            Ok(HookOutcome::Handled)
        })
}
