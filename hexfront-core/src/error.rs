//! Error types for generation, move legality and the turn engine

use thiserror::Error;

use crate::board::{Side, Terrain};
use crate::engine::MatchPhase;
use crate::hex::Hex;

/// Board generation could not produce a board satisfying its invariants.
///
/// Fatal to that generation attempt only; callers retry with another seed
/// or relaxed density.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("extent {width}x{height} is too small: {reason}")]
    ExtentTooSmall {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    #[error("base {0:?} is not a valid base cell")]
    InvalidBase(Hex),

    #[error("terrain constraints unsatisfied after {attempts} attempts (seed {seed})")]
    RetriesExhausted { attempts: u32, seed: u64 },
}

/// A submitted move breaks a movement or combat precondition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LegalityError {
    #[error("{0:?} is outside the board")]
    OutOfExtent(Hex),

    #[error("no unit at {0:?}")]
    NoUnit(Hex),

    #[error("unit at {hex:?} does not belong to {side:?}")]
    NotOwnUnit { hex: Hex, side: Side },

    #[error("source and target are both {0:?}")]
    SameCell(Hex),

    #[error("{to:?} is {distance} away from {from:?}, range is {range}")]
    OutOfRange {
        from: Hex,
        to: Hex,
        distance: u32,
        range: u32,
    },

    #[error("{hex:?} is {terrain:?} and cannot be entered")]
    Impassable { hex: Hex, terrain: Terrain },

    #[error("{0:?} is already held by a friendly unit")]
    FriendlyOccupied(Hex),

    #[error("{0:?} is already occupied")]
    Occupied(Hex),
}

/// Errors returned by the turn engine. None of them alter board or turn state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("illegal move: {0}")]
    Illegal(#[from] LegalityError),

    #[error("match is over: {0:?}")]
    MatchOver(MatchPhase),

    #[error("it is not {0:?}'s turn")]
    OutOfTurn(Side),
}

impl EngineError {
    /// Rejected moves leave the turn open for the same side to resubmit
    pub fn is_rejected_move(&self) -> bool {
        matches!(self, EngineError::Illegal(_))
    }
}
