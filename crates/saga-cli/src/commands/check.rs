use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;
use saga_core::{HookId, Script, SlideKind};

use crate::hooks::builtin_hooks;

pub fn run(path: &Path) -> Result<(), String> {
    let script = super::load_script(path)?;
    let issues = script.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("  {}", issue.to_string().red());
        } else {
            eprintln!("  {}", issue.to_string().yellow());
        }
    }

    let hooks = builtin_hooks();
    for hook in referenced_hooks(&script) {
        if !hooks.contains(hook.as_str()) {
            eprintln!(
                "  {}",
                format!("warning: hook '{hook}' is not provided by this player").yellow()
            );
        }
    }

    let errors = issues.iter().filter(|issue| issue.is_error()).count();
    if errors > 0 {
        return Err(format!(
            "validation failed with {errors} error{}",
            if errors == 1 { "" } else { "s" }
        ));
    }

    let slides: usize = script.chapters.iter().map(|chapter| chapter.slides.len()).sum();
    println!("  All checks passed for '{}'.", path.display());
    println!("  {} chapters, {slides} slides", script.chapters.len());
    Ok(())
}

/// Every hook id the script names, sorted.
fn referenced_hooks(script: &Script) -> BTreeSet<&HookId> {
    let mut hooks = BTreeSet::new();
    for chapter in &script.chapters {
        hooks.extend(chapter.on_finish.as_ref());
        for slide in &chapter.slides {
            hooks.extend(slide.on_enter.as_ref());
            hooks.extend(slide.on_advance.as_ref());
            match &slide.kind {
                SlideKind::Choice(choice) => {
                    hooks.extend(choice.options.iter().filter_map(|o| o.on_select.as_ref()));
                }
                SlideKind::Advance(advance) => {
                    let quest = advance.side_paths.quest.as_ref();
                    hooks.extend(quest.and_then(|q| q.on_complete.as_ref()));
                }
                _ => {}
            }
        }
    }
    hooks
}
