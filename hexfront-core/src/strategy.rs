//! Scored-candidate heuristic for the CPU side

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, Side};
use crate::combat::CombatResolver;
use crate::config::RulesConfig;
use crate::engine::Move;

// ============================================================================
// CONSTANTS
// ============================================================================

const BASE_CAPTURE: i64 = 10_000;
const WINNING_COMBAT: i64 = 3_000;
const CELL_CAPTURE: i64 = 2_000;
const REPOSITION: i64 = 1_000;
const LOSING_COMBAT: i64 = -1_000;

/// Extra weight for taking a cell from the opponent rather than a neutral one
const ENEMY_CELL_BONUS: i64 = 50;
/// Weight of one step of progress toward the enemy base
const ADVANCE_WEIGHT: i64 = 10;

// ============================================================================
// STRATEGY
// ============================================================================

/// A legal move and its heuristic value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub mv: Move,
    pub score: i64,
}

/// Picks one legal move per call. Without a seed, ties go to the lowest `Move`.
#[derive(Clone, Debug)]
pub struct CpuStrategy {
    resolver: CombatResolver,
    rng: Option<ChaCha8Rng>,
}

impl CpuStrategy {
    pub fn new(rules: &RulesConfig) -> Self {
        Self {
            resolver: CombatResolver::from_rules(rules),
            rng: None,
        }
    }

    /// Break ties uniformly at random, reproducibly for a given seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    /// Every legal movement for `side`, scored, in ascending `Move` order
    pub fn candidates(&self, board: &Board, side: Side) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for unit in board.units(side) {
            for to in self.resolver.targets(board, side, unit.pos) {
                let mv = Move::movement(unit.pos, to);
                candidates.push(Candidate {
                    mv,
                    score: self.score(board, side, mv),
                });
            }
        }
        candidates.sort_by_key(|c| c.mv);
        candidates
    }

    /// Best-scoring legal move, or `Pass` when there is none
    pub fn select_move(&mut self, board: &Board, side: Side) -> Move {
        let candidates = self.candidates(board, side);
        let Some(best) = candidates.iter().map(|c| c.score).max() else {
            return Move::Pass;
        };
        let top: Vec<Move> = candidates
            .iter()
            .filter(|c| c.score == best)
            .map(|c| c.mv)
            .collect();

        match self.rng.as_mut() {
            Some(rng) => top.choose(rng).copied().unwrap_or(Move::Pass),
            None => top[0],
        }
    }

    fn score(&self, board: &Board, side: Side, mv: Move) -> i64 {
        let Move::Movement { from, to } = mv else {
            return 0;
        };
        let enemy_base = board.base_of(side.opponent());

        let attacker = board.unit_at(from);
        let defender = board.unit_at(to);
        if let (Some(attacker), Some(defender)) = (attacker, defender) {
            let report = self.resolver.assess(board, attacker, defender);
            let margin = report.margin();
            return if !report.attacker_wins() {
                LOSING_COMBAT + margin
            } else if to == enemy_base {
                BASE_CAPTURE + margin
            } else {
                WINNING_COMBAT + margin
            };
        }

        if to == enemy_base {
            return BASE_CAPTURE;
        }

        let distance_after = to.distance_to(enemy_base) as i64;
        match board.owner(to) {
            Some(owner) if owner == side => {
                let gained = from.distance_to(enemy_base) as i64 - distance_after;
                REPOSITION + ADVANCE_WEIGHT * gained - distance_after
            }
            Some(_) => CELL_CAPTURE + ENEMY_CELL_BONUS - distance_after,
            None => CELL_CAPTURE - distance_after,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
