//! Configuration consumed at generation and match start
//!
//! Nothing here reads files; callers build these in code or deserialize
//! them from whatever format they like.

use serde::{Deserialize, Serialize};

/// Terrain density and retry budgets for board generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Minimum number of rivers that must be carved
    pub min_rivers: u32,
    /// Maximum number of rivers attempted
    pub max_rivers: u32,
    /// Minimum number of mountain clusters that must be placed
    pub min_mountain_clusters: u32,
    /// Maximum number of mountain clusters attempted
    pub max_mountain_clusters: u32,
    /// Upper bound on cells per mountain cluster (seed cell included)
    pub max_mountains_per_cluster: u32,
    /// Bases closer than this fail generation up front
    pub min_base_distance: u32,
    /// Cells within this distance of a base stay Plain
    pub spawn_safe_radius: u32,
    /// Candidate placements tried per feature before giving up on it
    pub feature_attempts: u32,
    /// Whole-board attempts before reporting a failure
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_rivers: 1,
            max_rivers: 2,
            min_mountain_clusters: 0,
            max_mountain_clusters: 3,
            max_mountains_per_cluster: 3,
            min_base_distance: 3,
            spawn_safe_radius: 1,
            feature_attempts: 24,
            max_attempts: 16,
        }
    }
}

impl GeneratorConfig {
    /// No rivers or mountains at all
    pub fn open_field() -> Self {
        Self {
            min_rivers: 0,
            max_rivers: 0,
            min_mountain_clusters: 0,
            max_mountain_clusters: 0,
            ..Default::default()
        }
    }

    pub fn with_rivers(mut self, min: u32, max: u32) -> Self {
        self.min_rivers = min;
        self.max_rivers = max;
        self
    }

    pub fn with_mountains(
        mut self,
        min_clusters: u32,
        max_clusters: u32,
        per_cluster: u32,
    ) -> Self {
        self.min_mountain_clusters = min_clusters;
        self.max_mountain_clusters = max_clusters;
        self.max_mountains_per_cluster = per_cluster;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

/// Strength modifiers applied to the attacker in combat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Attacker penalty when the target borders a river
    pub river_penalty: u32,
    /// Attacker penalty when the target borders a mountain
    pub mountain_penalty: u32,
    /// Attacker bonus when the defender is exposed
    pub exposed_bonus: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            river_penalty: 1,
            mountain_penalty: 1,
            exposed_bonus: 1,
        }
    }
}

impl CombatConfig {
    /// Raw strength against raw strength
    pub fn flat() -> Self {
        Self {
            river_penalty: 0,
            mountain_penalty: 0,
            exposed_bonus: 0,
        }
    }
}

/// Unit and turn rules for one match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Units spawned per side at match start
    pub starting_units: u32,
    /// Strength of every spawned unit
    pub unit_strength: u32,
    /// Reinforcement never pushes a unit above this
    pub max_strength: u32,
    /// Strength gained per full turn by units in supply
    pub reinforcement: u32,
    /// One extra point of reinforcement per this many cells in supply; 0 disables
    pub supply_bonus_cells: u32,
    /// Maximum hex distance of a single move or attack
    pub move_range: u32,
    /// The match is drawn once the turn counter passes this
    pub max_turns: u32,
    pub combat: CombatConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_units: 3,
            unit_strength: 3,
            max_strength: 9,
            reinforcement: 1,
            supply_bonus_cells: 0,
            move_range: 1,
            max_turns: 50,
            combat: CombatConfig::default(),
        }
    }
}

impl RulesConfig {
    pub fn with_starting_units(mut self, units: u32, strength: u32) -> Self {
        self.starting_units = units;
        self.unit_strength = strength;
        self
    }

    pub fn with_move_range(mut self, range: u32) -> Self {
        self.move_range = range;
        self
    }

    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }

    pub fn with_reinforcement(mut self, per_turn: u32) -> Self {
        self.reinforcement = per_turn;
        self
    }

    pub fn with_supply_bonus(mut self, cells_per_point: u32) -> Self {
        self.supply_bonus_cells = cells_per_point;
        self
    }

    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }
}

/// Everything needed to set up one match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub generator: GeneratorConfig,
    pub rules: RulesConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 8,
            seed: 42,
            generator: GeneratorConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl MatchConfig {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }
}
