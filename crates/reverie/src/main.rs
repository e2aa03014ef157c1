//! Reverie - turn a collection of memories into a melody.
//!
//! Main entry point for the Reverie CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::{Context, add, generate, list, similar};
use config::Config;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Reverie - turn a collection of memories into a melody
#[derive(Parser)]
#[command(name = "reverie")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file path (default: ~/.config/reverie/config.toml)
    #[arg(long, global = true, env = "REVERIE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store new memories
    Add(add::AddArgs),

    /// List stored memories
    List(list::ListArgs),

    /// Search memories by similarity
    Similar(similar::SimilarArgs),

    /// Generate a MIDI melody from the memory space
    Generate(generate::GenerateArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "reverie=debug,reverie_memory=debug,reverie_melody=debug,info"
    } else {
        "reverie=info,reverie_memory=info,reverie_melody=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(true)
        .init();

    let ctx = Context {
        config: Config::load(cli.config.as_deref())?,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Add(args) => add::run(args, &ctx),
        Commands::List(args) => list::run(args, &ctx),
        Commands::Similar(args) => similar::run(args, &ctx),
        Commands::Generate(args) => generate::run(args, &ctx),
    }
}
