//! HEXFRONT CLI - Command-line interface
//!
//! Commands:
//! - generate: Print a generated board
//! - simulate: Run CPU-vs-CPU matches in parallel
//! - play: Play a match against the CPU on stdin

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod generate_cmd;
mod play_cmd;
mod render;
mod settings;
mod simulate_cmd;

#[derive(Parser)]
#[command(name = "hexfront")]
#[command(about = "HEXFRONT hex-map strategy rules engine")]
struct Cli {
    /// Seed overriding the configured one
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Match configuration JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a board and print it
    Generate(generate_cmd::GenerateArgs),
    /// Run CPU-vs-CPU matches
    Simulate(simulate_cmd::SimulateArgs),
    /// Play against the CPU
    Play(play_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = settings::load_match_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Commands::Generate(args) => generate_cmd::run(args, config),
        Commands::Simulate(args) => simulate_cmd::run(args, config),
        Commands::Play(args) => play_cmd::run(args, config),
    }
}
