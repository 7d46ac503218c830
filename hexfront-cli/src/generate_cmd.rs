//! Generate command - build one board and print it

use anyhow::{Context, Result};
use clap::Args;

use hexfront_core::{Board, BoardGenerator, MatchConfig, Terrain};

use crate::render::render_board;
use crate::settings::with_size;

#[derive(Args)]
pub struct GenerateArgs {
    /// Board width in columns (overrides config)
    #[arg(long)]
    pub width: Option<u32>,

    /// Board height in rows (overrides config)
    #[arg(long)]
    pub height: Option<u32>,

    /// Print the board as JSON instead of ASCII
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: GenerateArgs, config: MatchConfig) -> Result<()> {
    let config = with_size(config, args.width, args.height);
    let generator = BoardGenerator::new(config.generator.clone());
    let board = generator
        .generate(config.width, config.height, config.seed)
        .with_context(|| {
            format!(
                "Failed to generate {}x{} board with seed {}",
                config.width, config.height, config.seed
            )
        })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&board)?);
    } else {
        print_summary(&board, &config);
        print!("{}", render_board(&board));
    }
    Ok(())
}

fn print_summary(board: &Board, config: &MatchConfig) {
    let path = board
        .shortest_path(board.player_base(), board.cpu_base())
        .map(|p| p.len().saturating_sub(1));

    println!(
        "Board {}x{} (seed {})",
        config.width, config.height, config.seed
    );
    println!(
        "  rivers: {} cells, mountains: {} cells",
        board.count_terrain(Terrain::River),
        board.count_terrain(Terrain::Mountain)
    );
    match path {
        Some(steps) => println!("  bases connected in {} steps", steps),
        None => println!("  bases NOT connected"),
    }
    println!();
}
