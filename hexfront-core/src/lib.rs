//! HEXFRONT Core - Rules engine for hex-map territory battles
//!
//! This crate provides the core game logic for HEXFRONT:
//! - Hex geometry (axial coordinates over a rectangular odd-q extent)
//! - Seeded board generation with rivers and mountains
//! - Board state, move legality and combat resolution
//! - Turn engine with elimination, reinforcement and turn ceiling
//! - Scored-candidate CPU opponent
//! - Multi-level campaigns

pub mod hex;
pub mod error;
pub mod config;
pub mod board;
pub mod generator;
pub mod combat;
pub mod engine;
pub mod strategy;
pub mod campaign;

// Re-exports for convenient access
pub use hex::{Extent, Hex, DIRECTIONS};
pub use error::{EngineError, GenerationFailure, LegalityError};
pub use config::{CombatConfig, GeneratorConfig, MatchConfig, RulesConfig};
pub use board::{Board, Cell, Side, Terrain, Unit};
pub use generator::{generate, BoardGenerator};
pub use combat::{
    is_exposed, is_frontline, CombatReport, CombatResolver, Modifier, ModifierKind, Outcome,
};
pub use engine::{MatchPhase, Move, Score, TurnEngine, TurnReport, TurnState};
pub use strategy::{Candidate, CpuStrategy};
pub use campaign::{Campaign, CampaignStatus};
