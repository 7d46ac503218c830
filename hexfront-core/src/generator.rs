//! Procedural terrain generation
//!
//! Produces a [`Board`] with two opposing bases, rivers and mountain
//! clusters. The same seed and dimensions always produce the same board.
//!
//! Every feature is placed as a candidate first and only committed if the
//! two bases can still reach each other over passable cells. Retries are
//! bounded at two levels: per feature (`feature_attempts`) and per board
//! (`max_attempts`).

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::board::{Board, Terrain};
use crate::config::GeneratorConfig;
use crate::error::GenerationFailure;
use crate::hex::{Extent, Hex};

/// Shortest river worth keeping
const MIN_RIVER_LENGTH: usize = 2;

/// Board generator (stateless apart from its configuration)
#[derive(Clone, Debug, Default)]
pub struct BoardGenerator {
    pub config: GeneratorConfig,
}

impl BoardGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate a board of `width` x `height` cells
    pub fn generate(&self, width: u32, height: u32, seed: u64) -> Result<Board, GenerationFailure> {
        let extent = Extent::new(width, height);
        let (player_base, cpu_base) = self.validate(extent)?;
        let safe = spawn_safe_cells(extent, [player_base, cpu_base], self.config.spawn_safe_radius);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for attempt in 1..=self.config.max_attempts {
            let mut board = Board::new(extent, player_base, cpu_base)?;
            if self.populate(&mut board, &safe, &mut rng) {
                debug!(
                    width,
                    height,
                    seed,
                    attempt,
                    rivers = board.count_terrain(Terrain::River),
                    mountains = board.count_terrain(Terrain::Mountain),
                    "board generated"
                );
                return Ok(board);
            }
            warn!(width, height, seed, attempt, "generation attempt abandoned");
        }

        Err(GenerationFailure::RetriesExhausted {
            attempts: self.config.max_attempts,
            seed,
        })
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Reject impossible requests before spending any attempts
    fn validate(&self, extent: Extent) -> Result<(Hex, Hex), GenerationFailure> {
        let cfg = &self.config;
        let too_small = |reason: String| GenerationFailure::ExtentTooSmall {
            width: extent.width,
            height: extent.height,
            reason,
        };

        if extent.width < 2 || extent.height < 2 {
            return Err(too_small("need at least 2 columns and 2 rows".into()));
        }
        if cfg.min_rivers > cfg.max_rivers {
            return Err(GenerationFailure::InvalidConfig(format!(
                "rivers: min {} > max {}",
                cfg.min_rivers, cfg.max_rivers
            )));
        }
        if cfg.min_mountain_clusters > cfg.max_mountain_clusters {
            return Err(GenerationFailure::InvalidConfig(format!(
                "mountain clusters: min {} > max {}",
                cfg.min_mountain_clusters, cfg.max_mountain_clusters
            )));
        }
        if cfg.max_mountain_clusters > 0 && cfg.max_mountains_per_cluster == 0 {
            return Err(GenerationFailure::InvalidConfig(
                "mountain clusters need at least one cell each".into(),
            ));
        }
        if cfg.max_attempts == 0 || cfg.feature_attempts == 0 {
            return Err(GenerationFailure::InvalidConfig(
                "attempt budgets must be positive".into(),
            ));
        }

        let (player_base, cpu_base) = extent.opposite_corners();
        let separation = player_base.distance_to(cpu_base);
        if separation < cfg.min_base_distance {
            return Err(too_small(format!(
                "bases only {} apart, need {}",
                separation, cfg.min_base_distance
            )));
        }

        let safe = spawn_safe_cells(extent, [player_base, cpu_base], cfg.spawn_safe_radius);
        let free: Vec<Hex> = extent.hexes().filter(|h| !safe.contains(h)).collect();
        let free_border = free.iter().filter(|h| extent.is_border(**h)).count();

        if cfg.min_rivers > 0 && free_border < MIN_RIVER_LENGTH {
            return Err(too_small("no room for a river outside the spawn zones".into()));
        }
        let required =
            cfg.min_rivers as usize * MIN_RIVER_LENGTH + cfg.min_mountain_clusters as usize;
        if required > free.len() {
            return Err(too_small(format!(
                "minimum features need {} cells, only {} available",
                required,
                free.len()
            )));
        }

        Ok((player_base, cpu_base))
    }

    // ========================================================================
    // FEATURE PLACEMENT
    // ========================================================================

    /// One whole-board attempt. False if a minimum could not be met.
    fn populate(&self, board: &mut Board, safe: &FxHashSet<Hex>, rng: &mut ChaCha8Rng) -> bool {
        let cfg = &self.config;

        let river_target = rng.gen_range(cfg.min_rivers..=cfg.max_rivers);
        let mut rivers = 0;
        for _ in 0..river_target {
            if self.carve_river(board, safe, rng) {
                rivers += 1;
            }
        }
        if rivers < cfg.min_rivers {
            debug!(rivers, min = cfg.min_rivers, "too few rivers");
            return false;
        }

        let cluster_target = rng.gen_range(cfg.min_mountain_clusters..=cfg.max_mountain_clusters);
        let mut clusters = 0;
        for _ in 0..cluster_target {
            if self.raise_mountains(board, safe, rng) {
                clusters += 1;
            }
        }
        if clusters < cfg.min_mountain_clusters {
            debug!(clusters, min = cfg.min_mountain_clusters, "too few mountain clusters");
            return false;
        }

        board.bases_connected()
    }

    fn carve_river(&self, board: &mut Board, safe: &FxHashSet<Hex>, rng: &mut ChaCha8Rng) -> bool {
        let extent = board.extent();
        let shorter_side = extent.width.min(extent.height).saturating_sub(1) as usize;
        let max_len = shorter_side.max(MIN_RIVER_LENGTH);

        for _ in 0..self.config.feature_attempts {
            let starts: Vec<Hex> = extent
                .hexes()
                .filter(|h| extent.is_border(*h) && is_open(board, safe, *h))
                .collect();
            let Some(&start) = starts.choose(rng) else {
                return false;
            };

            let target_len = rng.gen_range(MIN_RIVER_LENGTH..=max_len);
            let path = river_walk(board, safe, start, target_len, rng);
            if path.len() < MIN_RIVER_LENGTH {
                debug!(?start, "river walk stalled");
                continue;
            }

            if commit_if_connected(board, &path, Terrain::River) {
                return true;
            }
            debug!(?start, len = path.len(), "river would cut the bases apart");
        }

        false
    }

    fn raise_mountains(
        &self,
        board: &mut Board,
        safe: &FxHashSet<Hex>,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        let extent = board.extent();

        for _ in 0..self.config.feature_attempts {
            let open: Vec<Hex> = extent
                .hexes()
                .filter(|h| is_open(board, safe, *h))
                .collect();
            let interior: Vec<Hex> = open
                .iter()
                .copied()
                .filter(|h| !extent.is_border(*h))
                .collect();
            let pool = if interior.is_empty() {
                &open
            } else {
                &interior
            };
            let Some(&seed) = pool.choose(rng) else {
                return false;
            };

            let size = rng.gen_range(1..=self.config.max_mountains_per_cluster) as usize;
            let mut around: Vec<Hex> = extent
                .neighbors_of(seed)
                .filter(|n| is_open(board, safe, *n))
                .collect();
            around.shuffle(rng);

            let mut cluster = vec![seed];
            cluster.extend(around.into_iter().take(size - 1));

            if commit_if_connected(board, &cluster, Terrain::Mountain) {
                return true;
            }
            debug!(?seed, size = cluster.len(), "mountain cluster would cut the bases apart");
        }

        false
    }
}

/// Generate with the default configuration
pub fn generate(width: u32, height: u32, seed: u64) -> Result<Board, GenerationFailure> {
    BoardGenerator::default().generate(width, height, seed)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Cells within `radius` of either base, bases included
fn spawn_safe_cells(extent: Extent, bases: [Hex; 2], radius: u32) -> FxHashSet<Hex> {
    bases
        .iter()
        .flat_map(|base| base.within(radius))
        .filter(|h| extent.contains(*h))
        .collect()
}

/// Plain and outside the spawn zones
fn is_open(board: &Board, safe: &FxHashSet<Hex>, hex: Hex) -> bool {
    board.terrain(hex) == Some(Terrain::Plain) && !safe.contains(&hex)
}

/// Random walk away from `start`, preferring interior cells.
/// Stops at `target_len`, when stuck, or on reaching another border cell
/// once the path is `MIN_RIVER_LENGTH` long.
fn river_walk(
    board: &Board,
    safe: &FxHashSet<Hex>,
    start: Hex,
    target_len: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<Hex> {
    let extent = board.extent();
    let mut path = vec![start];
    let mut seen: FxHashSet<Hex> = FxHashSet::default();
    seen.insert(start);

    while path.len() < target_len {
        let current = path[path.len() - 1];
        let reach = current.distance_to(start);
        let options: Vec<Hex> = extent
            .neighbors_of(current)
            .filter(|n| !seen.contains(n) && is_open(board, safe, *n))
            .collect();

        let outward: Vec<Hex> = options
            .iter()
            .copied()
            .filter(|n| n.distance_to(start) > reach)
            .collect();
        let inland: Vec<Hex> = outward
            .iter()
            .copied()
            .filter(|n| !extent.is_border(*n))
            .collect();

        let pool = if !inland.is_empty() {
            &inland
        } else if !outward.is_empty() {
            &outward
        } else {
            &options
        };
        let Some(&next) = pool.choose(rng) else {
            break;
        };

        path.push(next);
        seen.insert(next);

        if path.len() >= MIN_RIVER_LENGTH && extent.is_border(next) {
            break;
        }
    }

    path
}

/// Apply `terrain` to `cells` only if the bases stay connected
fn commit_if_connected(board: &mut Board, cells: &[Hex], terrain: Terrain) -> bool {
    let mut candidate = board.clone();
    for hex in cells {
        candidate.set_terrain(*hex, terrain);
    }
    if !candidate.bases_connected() {
        return false;
    }
    *board = candidate;
    true
}

// ============================================================================
// TESTS
// ============================================================================
