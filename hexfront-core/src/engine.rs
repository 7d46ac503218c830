//! Turn engine: the single entry point for mutating a match
//!
//! The engine owns the `Board` and the `TurnState`. Each side submits one
//! move per turn (player first); the move goes through the `CombatResolver`
//! and end conditions are checked after every resolved move.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Side};
use crate::combat::{CombatResolver, Outcome};
use crate::config::{MatchConfig, RulesConfig};
use crate::error::{EngineError, GenerationFailure};
use crate::generator::BoardGenerator;
use crate::hex::Hex;
use crate::strategy::CpuStrategy;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Match phase; everything but `InProgress` is terminal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    InProgress,
    PlayerWon,
    CpuWon,
    Draw,
}

impl MatchPhase {
    pub fn is_terminal(self) -> bool {
        self != MatchPhase::InProgress
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            MatchPhase::PlayerWon => Some(Side::Player),
            MatchPhase::CpuWon => Some(Side::Cpu),
            MatchPhase::InProgress | MatchPhase::Draw => None,
        }
    }

    pub fn won_by(side: Side) -> Self {
        match side {
            Side::Player => MatchPhase::PlayerWon,
            Side::Cpu => MatchPhase::CpuWon,
        }
    }
}

/// Whose turn it is, which turn, and whether the match is still running
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub active: Side,
    /// Starts at 1, incremented after the CPU half of each turn
    pub turn: u32,
    pub phase: MatchPhase,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            active: Side::Player,
            turn: 1,
            phase: MatchPhase::InProgress,
        }
    }
}

/// A move intent. `Pass` is always legal and changes nothing on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Move {
    Pass,
    Movement { from: Hex, to: Hex },
}

impl Move {
    pub fn movement(from: Hex, to: Hex) -> Self {
        Move::Movement { from, to }
    }

    pub fn target(&self) -> Option<Hex> {
        match self {
            Move::Pass => None,
            Move::Movement { to, .. } => Some(*to),
        }
    }
}

/// Territory and unit totals per side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player_cells: usize,
    pub cpu_cells: usize,
    pub player_units: usize,
    pub cpu_units: usize,
}

impl Score {
    pub fn of(board: &Board) -> Self {
        Self {
            player_cells: board.owned_count(Side::Player),
            cpu_cells: board.owned_count(Side::Cpu),
            player_units: board.unit_count(Side::Player),
            cpu_units: board.unit_count(Side::Cpu),
        }
    }

    pub fn cells(&self, side: Side) -> usize {
        match side {
            Side::Player => self.player_cells,
            Side::Cpu => self.cpu_cells,
        }
    }

    pub fn units(&self, side: Side) -> usize {
        match side {
            Side::Player => self.player_units,
            Side::Cpu => self.cpu_units,
        }
    }

    /// Side ahead on territory, then on units
    pub fn leader(&self) -> Option<Side> {
        let key = |side| (self.cells(side), self.units(side));
        match key(Side::Player).cmp(&key(Side::Cpu)) {
            std::cmp::Ordering::Greater => Some(Side::Player),
            std::cmp::Ordering::Less => Some(Side::Cpu),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Both halves of one full turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub player: Outcome,
    /// Absent when the player's move ended the match
    pub cpu_move: Option<Move>,
    pub cpu: Option<Outcome>,
    pub state: TurnState,
}

// ============================================================================
// TURN ENGINE
// ============================================================================

pub struct TurnEngine {
    board: Board,
    state: TurnState,
    rules: RulesConfig,
    resolver: CombatResolver,
    strategy: CpuStrategy,
}

impl TurnEngine {
    /// Take over a freshly generated board and spawn both sides' units
    pub fn new(mut board: Board, rules: RulesConfig) -> Self {
        for side in Side::ALL {
            let placed = board.spawn_units(side, rules.starting_units, rules.unit_strength);
            debug!(?side, placed, "spawned units");
        }
        let mut engine = Self::resume(board, TurnState::default(), rules);
        engine.check_end();
        engine
    }

    /// Adopt an externally restored board and turn state as-is
    pub fn resume(board: Board, state: TurnState, rules: RulesConfig) -> Self {
        Self {
            board,
            state,
            resolver: CombatResolver::from_rules(&rules),
            strategy: CpuStrategy::new(&rules),
            rules,
        }
    }

    /// Generate a board from `config` and start a match on it
    pub fn start(config: &MatchConfig) -> Result<Self, GenerationFailure> {
        let board = BoardGenerator::new(config.generator.clone()).generate(
            config.width,
            config.height,
            config.seed,
        )?;
        Ok(Self::new(board, config.rules.clone()))
    }

    pub fn with_strategy(mut self, strategy: CpuStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn resolver(&self) -> &CombatResolver {
        &self.resolver
    }

    pub fn score(&self) -> Score {
        Score::of(&self.board)
    }

    pub fn is_over(&self) -> bool {
        self.state.phase.is_terminal()
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Every legal move for `side` on the current board, Pass first
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = vec![Move::Pass];
        for unit in self.board.units(side) {
            moves.extend(
                self.resolver
                    .targets(&self.board, side, unit.pos)
                    .into_iter()
                    .map(|to| Move::movement(unit.pos, to)),
            );
        }
        moves
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Apply one move for the active side. Errors leave the match untouched.
    pub fn apply(&mut self, side: Side, mv: Move) -> Result<Outcome, EngineError> {
        if self.state.phase.is_terminal() {
            return Err(EngineError::MatchOver(self.state.phase));
        }
        if side != self.state.active {
            return Err(EngineError::OutOfTurn(side));
        }

        let outcome = self.resolver.resolve(&mut self.board, side, mv)?;
        debug!(
            ?side,
            ?mv,
            turn = self.state.turn,
            combat = outcome.combat_occurred,
            captured = ?outcome.captured,
            "move applied"
        );

        self.end_half(side);
        Ok(outcome)
    }

    pub fn submit_player_move(&mut self, mv: Move) -> Result<Outcome, EngineError> {
        self.apply(Side::Player, mv)
    }

    /// Let the strategy pick and play the CPU's move
    pub fn play_cpu_turn(&mut self) -> Result<(Move, Outcome), EngineError> {
        if self.state.phase.is_terminal() {
            return Err(EngineError::MatchOver(self.state.phase));
        }
        if self.state.active != Side::Cpu {
            return Err(EngineError::OutOfTurn(Side::Cpu));
        }
        let mv = self.strategy.select_move(&self.board, Side::Cpu);
        let outcome = self.apply(Side::Cpu, mv)?;
        Ok((mv, outcome))
    }

    /// Player move followed by the CPU reply
    pub fn play_turn(&mut self, mv: Move) -> Result<TurnReport, EngineError> {
        let player = self.submit_player_move(mv)?;
        if self.is_over() {
            return Ok(TurnReport {
                player,
                cpu_move: None,
                cpu: None,
                state: self.state,
            });
        }

        let (cpu_move, cpu) = self.play_cpu_turn()?;
        Ok(TurnReport {
            player,
            cpu_move: Some(cpu_move),
            cpu: Some(cpu),
            state: self.state,
        })
    }

    /// Play the match out with `player` choosing the player's moves
    pub fn autoplay(&mut self, player: &mut CpuStrategy) -> Result<MatchPhase, EngineError> {
        while !self.is_over() {
            match self.state.active {
                Side::Player => {
                    let mv = player.select_move(&self.board, Side::Player);
                    self.apply(Side::Player, mv)?;
                }
                Side::Cpu => {
                    self.play_cpu_turn()?;
                }
            }
        }
        Ok(self.state.phase)
    }

    // ========================================================================
    // TURN BOOKKEEPING
    // ========================================================================

    fn end_half(&mut self, side: Side) {
        if self.check_end() {
            return;
        }

        if side == Side::Cpu {
            self.state.turn += 1;
            self.reinforce();
            if self.state.turn > self.rules.max_turns {
                self.conclude(MatchPhase::Draw);
                return;
            }
        }
        self.state.active = side.opponent();
    }

    /// A side is out once it has no units, no territory, or has lost its base
    pub fn is_eliminated(&self, side: Side) -> bool {
        self.board.unit_count(side) == 0
            || self.board.owned_count(side) == 0
            || self.board.owner(self.board.base_of(side)) == Some(side.opponent())
    }

    fn check_end(&mut self) -> bool {
        let phase = match (
            self.is_eliminated(Side::Player),
            self.is_eliminated(Side::Cpu),
        ) {
            (true, true) => MatchPhase::Draw,
            (true, false) => MatchPhase::CpuWon,
            (false, true) => MatchPhase::PlayerWon,
            (false, false) => return false,
        };
        self.conclude(phase);
        true
    }

    fn conclude(&mut self, phase: MatchPhase) {
        self.state.phase = phase;
        let score = self.score();
        info!(?phase, turn = self.state.turn, ?score, "match over");
    }

    /// Units connected to their base gain strength, capped at `max_strength`.
    /// A side holding a wide supplied territory reinforces faster.
    fn reinforce(&mut self) {
        let cap = self.rules.max_strength;

        for side in Side::ALL {
            let reach = self.board.supply_reach(side);
            let amount = self.reinforcement_for(reach.len());
            if amount == 0 {
                continue;
            }
            let supplied: Vec<Hex> = self
                .board
                .units(side)
                .map(|u| u.pos)
                .filter(|pos| reach.contains(pos))
                .collect();
            for pos in supplied {
                if let Some(unit) = self.board.unit_mut(pos) {
                    if unit.strength < cap {
                        unit.strength = unit.strength.saturating_add(amount).min(cap);
                    }
                }
            }
        }
    }

    /// Per-unit reinforcement for a side whose supply reaches `supplied_cells`
    pub fn reinforcement_for(&self, supplied_cells: usize) -> u32 {
        let bonus = match self.rules.supply_bonus_cells {
            0 => 0,
            per_point => u32::try_from(supplied_cells / per_point as usize).unwrap_or(u32::MAX),
        };
        self.rules.reinforcement.saturating_add(bonus)
    }
}

// ============================================================================
// TESTS
// ============================================================================
