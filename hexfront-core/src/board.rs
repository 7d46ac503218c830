//! Board state: terrain, ownership and units for one match

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationFailure, LegalityError};
use crate::hex::{Extent, Hex};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One of the two sides in a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player = 0,
    Cpu = 1,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Player, Side::Cpu];

    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Cpu,
            Side::Cpu => Side::Player,
        }
    }
}

/// Terrain kind of a cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Plain,
    River,
    Mountain,
}

impl Terrain {
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Plain)
    }
}

/// A movable, attacking token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub side: Side,
    pub strength: u32,
    pub pos: Hex,
}

/// One board position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub hex: Hex,
    pub terrain: Terrain,
    pub owner: Option<Side>,
    pub occupant: Option<Unit>,
}

impl Cell {
    fn plain(hex: Hex) -> Self {
        Self {
            hex,
            terrain: Terrain::Plain,
            owner: None,
            occupant: None,
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// All cells of the current match plus the two base positions.
///
/// Cells are stored column-major, which for odd-q offsets is also ascending
/// `Hex` order; every iterator below yields cells in that order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    extent: Extent,
    cells: Vec<Cell>,
    player_base: Hex,
    cpu_base: Hex,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// All-Plain board with each base owned by its side
    pub fn new(extent: Extent, player_base: Hex, cpu_base: Hex) -> Result<Self, GenerationFailure> {
        for base in [player_base, cpu_base] {
            if !extent.contains(base) {
                return Err(GenerationFailure::InvalidBase(base));
            }
        }
        if player_base == cpu_base {
            return Err(GenerationFailure::InvalidBase(cpu_base));
        }

        let cells = extent.hexes().map(Cell::plain).collect();
        let mut board = Self {
            extent,
            cells,
            player_base,
            cpu_base,
        };
        board.set_owner(player_base, Side::Player);
        board.set_owner(cpu_base, Side::Cpu);
        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn player_base(&self) -> Hex {
        self.player_base
    }

    pub fn cpu_base(&self) -> Hex {
        self.cpu_base
    }

    pub fn base_of(&self, side: Side) -> Hex {
        match side {
            Side::Player => self.player_base,
            Side::Cpu => self.cpu_base,
        }
    }

    pub fn is_base(&self, hex: Hex) -> bool {
        hex == self.player_base || hex == self.cpu_base
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.extent.contains(hex)
    }

    pub fn cell(&self, hex: Hex) -> Option<&Cell> {
        self.extent.index_of(hex).and_then(|i| self.cells.get(i))
    }

    fn cell_mut(&mut self, hex: Hex) -> Option<&mut Cell> {
        match self.extent.index_of(hex) {
            Some(i) => self.cells.get_mut(i),
            None => None,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn terrain(&self, hex: Hex) -> Option<Terrain> {
        self.cell(hex).map(|c| c.terrain)
    }

    pub fn owner(&self, hex: Hex) -> Option<Side> {
        self.cell(hex).and_then(|c| c.owner)
    }

    /// In extent and enterable terrain (units are not considered)
    pub fn is_passable(&self, hex: Hex) -> bool {
        self.cell(hex).map_or(false, |c| c.terrain.is_passable())
    }

    pub fn unit_at(&self, hex: Hex) -> Option<&Unit> {
        self.cell(hex).and_then(|c| c.occupant.as_ref())
    }

    /// Units of one side in ascending position order
    pub fn units(&self, side: Side) -> impl Iterator<Item = &Unit> + '_ {
        self.cells
            .iter()
            .filter_map(|c| c.occupant.as_ref())
            .filter(move |u| u.side == side)
    }

    pub fn unit_count(&self, side: Side) -> usize {
        self.units(side).count()
    }

    pub fn total_units(&self) -> usize {
        self.cells.iter().filter(|c| c.occupant.is_some()).count()
    }

    pub fn owned_count(&self, side: Side) -> usize {
        self.cells.iter().filter(|c| c.owner == Some(side)).count()
    }

    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.terrain.is_passable()).count()
    }

    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|c| c.terrain == terrain).count()
    }

    // ========================================================================
    // NEIGHBORHOOD QUERIES
    // ========================================================================

    pub fn neighbors(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        self.extent.neighbors_of(hex)
    }

    pub fn passable_neighbors(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        self.extent
            .neighbors_of(hex)
            .filter(move |n| self.is_passable(*n))
    }

    /// True if any neighbor of `hex` has the given terrain
    pub fn borders_terrain(&self, hex: Hex, terrain: Terrain) -> bool {
        self.neighbors(hex).any(|n| self.terrain(n) == Some(terrain))
    }

    /// Neighbors of `hex` owned by `side`
    pub fn friendly_neighbors(&self, hex: Hex, side: Side) -> usize {
        self.neighbors(hex)
            .filter(|n| self.owner(*n) == Some(side))
            .count()
    }

    /// Shortest route over passable cells, ignoring units. Both ends included.
    pub fn shortest_path(&self, from: Hex, to: Hex) -> Option<Vec<Hex>> {
        if !self.is_passable(from) || !self.is_passable(to) {
            return None;
        }

        let mut previous: FxHashMap<Hex, Hex> = FxHashMap::default();
        let mut visited: FxHashSet<Hex> = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(&prev) = previous.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }

            for next in self.passable_neighbors(current) {
                if visited.insert(next) {
                    previous.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    pub fn is_connected(&self, a: Hex, b: Hex) -> bool {
        self.shortest_path(a, b).is_some()
    }

    /// A passable route exists between the two bases
    pub fn bases_connected(&self) -> bool {
        self.is_connected(self.player_base, self.cpu_base)
    }

    /// Cells owned by `side` that connect to its base through cells it owns.
    /// Empty once the base has been lost.
    pub fn supply_reach(&self, side: Side) -> FxHashSet<Hex> {
        let base = self.base_of(side);
        let mut reach = FxHashSet::default();
        if self.owner(base) != Some(side) {
            return reach;
        }

        let mut queue = VecDeque::new();
        reach.insert(base);
        queue.push_back(base);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if self.owner(next) == Some(side) && reach.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        reach
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    /// Put a new unit on an empty passable cell and claim the cell
    pub fn place_unit(&mut self, side: Side, hex: Hex, strength: u32) -> Result<(), LegalityError> {
        let cell = self.cell_mut(hex).ok_or(LegalityError::OutOfExtent(hex))?;
        if !cell.terrain.is_passable() {
            return Err(LegalityError::Impassable {
                hex,
                terrain: cell.terrain,
            });
        }
        if cell.occupant.is_some() {
            return Err(LegalityError::Occupied(hex));
        }

        cell.occupant = Some(Unit {
            side,
            strength,
            pos: hex,
        });
        cell.owner = Some(side);
        Ok(())
    }

    /// Spawn up to `count` units at the base, then on the nearest free
    /// passable cells. Returns how many were placed.
    pub fn spawn_units(&mut self, side: Side, count: u32, strength: u32) -> u32 {
        let base = self.base_of(side);
        let mut placed = 0;
        if count == 0 || !self.is_passable(base) {
            return placed;
        }

        let mut visited: FxHashSet<Hex> = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(base);
        queue.push_back(base);

        while let Some(current) = queue.pop_front() {
            if placed >= count {
                break;
            }
            if self.place_unit(side, current, strength).is_ok() {
                placed += 1;
            }
            let next: Vec<Hex> = self.passable_neighbors(current).collect();
            for n in next {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        placed
    }

    // ========================================================================
    // MUTATION (generator and combat only)
    // ========================================================================

    pub(crate) fn set_terrain(&mut self, hex: Hex, terrain: Terrain) {
        if let Some(cell) = self.cell_mut(hex) {
            cell.terrain = terrain;
        }
    }

    pub(crate) fn set_owner(&mut self, hex: Hex, side: Side) {
        if let Some(cell) = self.cell_mut(hex) {
            cell.owner = Some(side);
        }
    }

    pub(crate) fn unit_mut(&mut self, hex: Hex) -> Option<&mut Unit> {
        self.cell_mut(hex).and_then(|c| c.occupant.as_mut())
    }

    pub(crate) fn remove_unit(&mut self, hex: Hex) -> Option<Unit> {
        self.cell_mut(hex).and_then(|c| c.occupant.take())
    }

    /// Move the unit at `from` onto the empty cell `to`
    pub(crate) fn relocate_unit(&mut self, from: Hex, to: Hex) -> bool {
        if self.unit_at(to).is_some() || !self.contains(to) {
            return false;
        }
        let Some(mut unit) = self.remove_unit(from) else {
            return false;
        };
        unit.pos = to;
        if let Some(cell) = self.cell_mut(to) {
            cell.occupant = Some(unit);
        }
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================
