//! Terminal frontend for the Saga chapter engine.

mod commands;
mod hooks;
mod journal;
mod presenter;
mod session;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use saga_engine::CelebrationPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "saga",
    about = "Saga: play and check chapter-based story scripts",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a script and report structural problems
    Check {
        /// Script file (JSON)
        script: PathBuf,
    },

    /// List chapters and whether they are unlocked
    Chapters {
        /// Script file (JSON)
        script: PathBuf,

        /// Directory holding saved progress
        #[arg(short, long, default_value = ".saga")]
        save_dir: PathBuf,
    },

    /// Play a chapter interactively
    Play {
        /// Script file (JSON)
        script: PathBuf,

        /// Chapter to start (default: the script's first chapter)
        #[arg(short, long)]
        chapter: Option<String>,

        /// Directory holding saved progress
        #[arg(short, long, default_value = ".saga")]
        save_dir: PathBuf,

        /// Keep progress in memory only
        #[arg(long)]
        no_save: bool,

        /// When to announce that a recipe's prerequisites are held
        #[arg(long, value_enum, default_value_t = Celebrate::OnCraft)]
        celebrate: Celebrate,

        /// Write a markdown journal of the session to this file
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },

    /// Show the saved inventory and wallet
    Inventory {
        /// Directory holding saved progress
        #[arg(short, long, default_value = ".saga")]
        save_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum Celebrate {
    OnCraft,
    EveryVisit,
}

impl From<Celebrate> for CelebrationPolicy {
    fn from(value: Celebrate) -> Self {
        match value {
            Celebrate::OnCraft => CelebrationPolicy::OnCraft,
            Celebrate::EveryVisit => CelebrationPolicy::EveryVisit,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { script } => commands::check::run(&script),
        Commands::Chapters { script, save_dir } => commands::chapters::run(&script, &save_dir),
        Commands::Play {
            script,
            chapter,
            save_dir,
            no_save,
            celebrate,
            journal,
        } => commands::play::run(&commands::play::PlayOptions {
            script,
            chapter,
            save_dir: (!no_save).then_some(save_dir),
            celebration: celebrate.into(),
            journal,
        }),
        Commands::Inventory { save_dir } => commands::inventory::run(&save_dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
