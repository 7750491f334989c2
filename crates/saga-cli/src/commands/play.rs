use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use saga_core::ChapterId;
use saga_engine::{CelebrationPolicy, Engine, EngineConfig};
use saga_profile::{MemoryStorage, Storage, StorageKeys, StoredProfile, UnlockStore};

use crate::hooks::builtin_hooks;
use crate::session::Session;

/// Everything `saga play` was asked to do.
pub struct PlayOptions {
    pub script: PathBuf,
    pub chapter: Option<String>,
    /// `None` keeps progress in memory.
    pub save_dir: Option<PathBuf>,
    pub celebration: CelebrationPolicy,
    pub journal: Option<PathBuf>,
}

pub fn run(options: &PlayOptions) -> Result<(), String> {
    let script = super::load_script(&options.script)?;
    let errors: Vec<String> = script
        .validate()
        .into_iter()
        .filter(|issue| issue.is_error())
        .map(|issue| issue.to_string())
        .collect();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  {error}");
        }
        return Err("script has errors; run 'saga check' for details".into());
    }

    let engine = Engine::new(script)
        .with_hooks(builtin_hooks())
        .with_config(EngineConfig::default().with_celebration(options.celebration));

    match &options.save_dir {
        Some(dir) => play(
            &engine,
            super::open_saves(dir)?,
            super::open_saves(dir)?,
            options,
        ),
        None => play(&engine, MemoryStorage::new(), MemoryStorage::new(), options),
    }
}

fn play<S: Storage>(
    engine: &Engine,
    profile_storage: S,
    unlock_storage: S,
    options: &PlayOptions,
) -> Result<(), String> {
    let keys = StorageKeys::default();
    let first = engine.script().first_chapter.clone();
    let profile = StoredProfile::load(profile_storage, &keys);
    let unlocks = UnlockStore::open(unlock_storage, &keys, &first);
    let mut session = Session::new(engine, profile, unlocks);

    let chapter = options.chapter.as_deref().map_or(first, ChapterId::new);
    println!("  {} {}", "Playing".bold(), options.script.display());
    println!("  Type 'help' for commands, 'quit' to exit.\n");
    println!("{}\n", session.start(&chapter)?);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.process(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
                if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
                    break;
                }
            }
            Err(e) => println!("  {}\n", e.yellow()),
        }
    }

    if let Some(path) = &options.journal {
        fs::write(path, session.journal().export_markdown())
            .map_err(|e| format!("cannot write journal '{}': {e}", path.display()))?;
        println!("  Journal written to {} ({} entries).", path.display(), session.journal().len());
    }
    Ok(())
}
