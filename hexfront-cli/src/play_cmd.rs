//! Play command - interactive match against the CPU on stdin
//!
//! Input, one per line: `q r q r` (axial source and target), `pass`,
//! `moves` to list legal moves, or `quit`.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Args;

use hexfront_core::{Hex, MatchConfig, MatchPhase, Move, Outcome, Side, TurnEngine};

use crate::render::render_board;
use crate::settings::with_size;

#[derive(Args)]
pub struct PlayArgs {
    /// Board width in columns (overrides config)
    #[arg(long)]
    pub width: Option<u32>,

    /// Board height in rows (overrides config)
    #[arg(long)]
    pub height: Option<u32>,
}

/// One parsed input line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Play(Move),
    ListMoves,
    Quit,
}

pub fn run(args: PlayArgs, config: MatchConfig) -> Result<()> {
    let config = with_size(config, args.width, args.height);
    let mut engine = TurnEngine::start(&config).with_context(|| {
        format!(
            "Failed to start {}x{} match with seed {}",
            config.width, config.height, config.seed
        )
    })?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !engine.is_over() {
        print_status(&engine);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let command = match parse_command(&line?) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::ListMoves => print_moves(&engine),
            Command::Play(mv) => match engine.play_turn(mv) {
                Ok(report) => {
                    describe("You", &report.player);
                    if let (Some(cpu_move), Some(cpu)) = (report.cpu_move, report.cpu.as_ref()) {
                        println!("CPU plays {}", format_move(cpu_move));
                        describe("CPU", cpu);
                    }
                }
                // Rejected moves keep the turn open
                Err(err) => println!("Rejected: {}", err),
            },
        }
    }

    print!("{}", render_board(engine.board()));
    let score = engine.score();
    let verdict = match engine.phase() {
        MatchPhase::PlayerWon => "You win!",
        MatchPhase::CpuWon => "The CPU wins.",
        MatchPhase::Draw => "Draw.",
        MatchPhase::InProgress => "Match abandoned.",
    };
    println!(
        "{} Cells {}-{}, units {}-{}",
        verdict, score.player_cells, score.cpu_cells, score.player_units, score.cpu_units
    );
    Ok(())
}

pub fn parse_command(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["quit"] | ["q"] | ["exit"] => Ok(Command::Quit),
        ["pass"] | ["p"] => Ok(Command::Play(Move::Pass)),
        ["moves"] | ["m"] => Ok(Command::ListMoves),
        [a, b, c, d] => {
            let mut coords = [0i32; 4];
            for (slot, word) in coords.iter_mut().zip([a, b, c, d]) {
                *slot = word
                    .parse()
                    .with_context(|| format!("'{}' is not a coordinate", word))?;
            }
            Ok(Command::Play(Move::movement(
                Hex::new(coords[0], coords[1]),
                Hex::new(coords[2], coords[3]),
            )))
        }
        _ => bail!("expected 'q r q r', 'pass', 'moves' or 'quit'"),
    }
}

fn print_status(engine: &TurnEngine) {
    let state = engine.state();
    let score = engine.score();
    println!();
    print!("{}", render_board(engine.board()));
    println!(
        "Turn {} of {} | cells {}-{} | units {}-{}",
        state.turn,
        engine.rules().max_turns,
        score.player_cells,
        score.cpu_cells,
        score.player_units,
        score.cpu_units
    );
    let units: Vec<String> = engine
        .board()
        .units(Side::Player)
        .map(|u| format!("({},{}) str {}", u.pos.q, u.pos.r, u.strength))
        .collect();
    println!("Your units: {}", units.join(", "));
}

fn print_moves(engine: &TurnEngine) {
    for mv in engine.legal_moves(Side::Player) {
        println!("  {}", format_move(mv));
    }
}

fn describe(who: &str, outcome: &Outcome) {
    if let Some(report) = &outcome.report {
        let modifiers: Vec<String> = report
            .modifiers
            .iter()
            .map(|m| format!("{:?} {:+}", m.kind, m.delta))
            .collect();
        println!(
            "  {} attack {} (effective {}) vs {}{}: {:?} wins, survivor at {}",
            who,
            report.attacker_strength,
            report.attacker_effective,
            report.defender_strength,
            if modifiers.is_empty() {
                String::new()
            } else {
                format!(" [{}]", modifiers.join(", "))
            },
            report.winner,
            report.survivor_strength
        );
    }
    if let Some(hex) = outcome.captured {
        println!("  {} captured ({},{})", who, hex.q, hex.r);
    }
}

fn format_move(mv: Move) -> String {
    match mv {
        Move::Pass => "pass".to_string(),
        Move::Movement { from, to } => format!("{} {} {} {}", from.q, from.r, to.q, to.r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movement() {
        assert_eq!(
            parse_command(" 1 0  2 -1 ").unwrap(),
            Command::Play(Move::movement(Hex::new(1, 0), Hex::new(2, -1)))
        );
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("pass").unwrap(), Command::Play(Move::Pass));
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("moves").unwrap(), Command::ListMoves);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("1 2 3").is_err());
        assert!(parse_command("1 x 3 4").is_err());
    }

    #[test]
    fn test_extreme_coordinates_are_rejected() {
        let Command::Play(mv) = parse_command("2 2147483647 0 0").unwrap() else {
            panic!("expected a move");
        };
        let mut engine = TurnEngine::start(&MatchConfig::new(6, 6, 1)).unwrap();
        let err = engine.play_turn(mv).unwrap_err();
        assert!(err.is_rejected_move());
        assert_eq!(engine.state().turn, 1);
    }

    #[test]
    fn test_format_move_round_trips_through_parse() {
        let mv = Move::movement(Hex::new(3, -1), Hex::new(3, 0));
        assert_eq!(parse_command(&format_move(mv)).unwrap(), Command::Play(mv));
    }
}
