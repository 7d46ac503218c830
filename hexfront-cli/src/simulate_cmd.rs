//! Simulate command - CPU-vs-CPU matches
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting

use anyhow::Result;
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;

use hexfront_core::{CpuStrategy, MatchConfig, MatchPhase, Score, TurnEngine};

use crate::settings::with_size;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of matches to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Board width in columns (overrides config)
    #[arg(long)]
    pub width: Option<u32>,

    /// Board height in rows (overrides config)
    #[arg(long)]
    pub height: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single match
#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    pub game_number: usize,
    pub seed: u64,
    pub phase: Option<MatchPhase>,
    pub turns: u32,
    pub score: Score,
    /// Set when the board could not be generated
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Statistics {
    pub total_games: usize,
    pub player_wins: usize,
    pub cpu_wins: usize,
    pub draws: usize,
    pub failed: usize,
    pub avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SimulateArgs, config: MatchConfig) -> Result<()> {
    let config = with_size(config, args.width, args.height);
    tracing::info!(
        games = args.games,
        width = config.width,
        height = config.height,
        seed = config.seed,
        "starting simulation"
    );

    let games = play_games(&config, args.games);
    let stats = compute_statistics(&games);
    report_results(&games, &stats, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Independent matches in parallel; game `i` uses seed `config.seed + i`
pub fn play_games(config: &MatchConfig, games: usize) -> Vec<GameRecord> {
    (0..games)
        .into_par_iter()
        .map(|i| play_single_game(config, i + 1, config.seed.wrapping_add(i as u64)))
        .collect()
}

fn report_results(games: &[GameRecord], stats: &Statistics, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            statistics: &'a Statistics,
            games: &'a [GameRecord],
        }
        let output = JsonOutput {
            statistics: stats,
            games,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_results(games, stats);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(config: &MatchConfig, game_number: usize, seed: u64) -> GameRecord {
    let config = config.clone().with_seed(seed);
    let mut record = GameRecord {
        game_number,
        seed,
        phase: None,
        turns: 0,
        score: Score::default(),
        error: None,
    };

    let engine = match TurnEngine::start(&config) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::warn!(game_number, seed, %err, "board generation failed");
            record.error = Some(err.to_string());
            return record;
        }
    };

    let mut engine = engine.with_strategy(CpuStrategy::new(&config.rules).with_seed(seed));
    let mut player = CpuStrategy::new(&config.rules).with_seed(seed.wrapping_add(1));

    match engine.autoplay(&mut player) {
        Ok(phase) => record.phase = Some(phase),
        Err(err) => record.error = Some(err.to_string()),
    }
    record.turns = engine.state().turn;
    record.score = engine.score();
    tracing::debug!(game_number, phase = ?record.phase, turns = record.turns, "game finished");
    record
}

pub fn compute_statistics(games: &[GameRecord]) -> Statistics {
    let count = |phase| games.iter().filter(|g| g.phase == Some(phase)).count();
    let finished: Vec<&GameRecord> = games.iter().filter(|g| g.phase.is_some()).collect();
    let total_turns: u32 = finished.iter().map(|g| g.turns).sum();

    Statistics {
        total_games: games.len(),
        player_wins: count(MatchPhase::PlayerWon),
        cpu_wins: count(MatchPhase::CpuWon),
        draws: count(MatchPhase::Draw),
        failed: games.len() - finished.len(),
        avg_turns: if finished.is_empty() {
            0.0
        } else {
            total_turns as f32 / finished.len() as f32
        },
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn print_text_results(games: &[GameRecord], stats: &Statistics) {
    for game in games {
        match (&game.phase, &game.error) {
            (Some(phase), _) => println!(
                "Game {:>3} (seed {}): {:?} after {} turns, cells {}-{}, units {}-{}",
                game.game_number,
                game.seed,
                phase,
                game.turns,
                game.score.player_cells,
                game.score.cpu_cells,
                game.score.player_units,
                game.score.cpu_units
            ),
            (None, Some(err)) => println!(
                "Game {:>3} (seed {}): failed: {}",
                game.game_number, game.seed, err
            ),
            (None, None) => {}
        }
    }

    let pct = |n: usize| {
        if stats.total_games > 0 {
            100.0 * n as f32 / stats.total_games as f32
        } else {
            0.0
        }
    };
    println!("\n=== Simulation Results ===");
    println!("Total games: {}", stats.total_games);
    println!("Player wins: {} ({:.1}%)", stats.player_wins, pct(stats.player_wins));
    println!("CPU wins:    {} ({:.1}%)", stats.cpu_wins, pct(stats.cpu_wins));
    println!("Draws:       {} ({:.1}%)", stats.draws, pct(stats.draws));
    if stats.failed > 0 {
        println!("Failed:      {}", stats.failed);
    }
    println!("Avg turns:   {:.1}", stats.avg_turns);
}
