//! Move legality and combat resolution
//!
//! Attacks compare the attacker's effective strength (raw strength plus
//! terrain and topology modifiers) against the defender's raw strength.
//! Higher wins; ties hold for the defender. The survivor keeps the
//! difference, at least 1 and never more than it had.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Side, Terrain, Unit};
use crate::config::{CombatConfig, RulesConfig};
use crate::engine::Move;
use crate::error::LegalityError;
use crate::hex::Hex;

// ============================================================================
// REPORT TYPES
// ============================================================================

/// Why the attacker's strength was adjusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Target borders a river
    RiverBank,
    /// Target borders a mountain
    HighGround,
    /// Defender lacks two friendly neighbors or is cut off from its base
    ExposedDefender,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub delta: i32,
}

/// Detailed numbers behind one combat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub attacker: Side,
    pub attacker_strength: u32,
    pub defender_strength: u32,
    pub modifiers: Vec<Modifier>,
    pub attacker_effective: i64,
    pub winner: Side,
    /// Strength left to the winning unit
    pub survivor_strength: u32,
}

impl CombatReport {
    pub fn attacker_wins(&self) -> bool {
        self.winner == self.attacker
    }

    /// Effective attacker strength minus defender strength
    pub fn margin(&self) -> i64 {
        self.attacker_effective - self.defender_strength as i64
    }
}

/// Result of one resolved move, for scoring and UI feedback
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The acting unit now stands on the target
    pub moved: bool,
    pub combat_occurred: bool,
    pub winner: Option<Side>,
    /// Set when the target changed owner
    pub captured: Option<Hex>,
    /// Unit removed by combat
    pub casualty: Option<Unit>,
    pub report: Option<CombatReport>,
}

impl Outcome {
    /// No-op outcome of a passed turn
    pub fn pass() -> Self {
        Self::default()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Checks and applies moves against a borrowed board
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatResolver {
    move_range: u32,
    combat: CombatConfig,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::from_rules(&RulesConfig::default())
    }
}

impl CombatResolver {
    pub fn new(move_range: u32, combat: CombatConfig) -> Self {
        Self { move_range, combat }
    }

    pub fn from_rules(rules: &RulesConfig) -> Self {
        Self::new(rules.move_range, rules.combat.clone())
    }

    pub fn move_range(&self) -> u32 {
        self.move_range
    }

    /// Every precondition of a `from -> to` move by `side`
    pub fn check(
        &self,
        board: &Board,
        side: Side,
        from: Hex,
        to: Hex,
    ) -> Result<(), LegalityError> {
        if !board.contains(from) {
            return Err(LegalityError::OutOfExtent(from));
        }
        let unit = board.unit_at(from).ok_or(LegalityError::NoUnit(from))?;
        if unit.side != side {
            return Err(LegalityError::NotOwnUnit { hex: from, side });
        }
        if from == to {
            return Err(LegalityError::SameCell(from));
        }

        let cell = board.cell(to).ok_or(LegalityError::OutOfExtent(to))?;
        let distance = from.distance_to(to);
        if distance > self.move_range {
            return Err(LegalityError::OutOfRange {
                from,
                to,
                distance,
                range: self.move_range,
            });
        }
        if !cell.terrain.is_passable() {
            return Err(LegalityError::Impassable {
                hex: to,
                terrain: cell.terrain,
            });
        }
        if cell.occupant.map_or(false, |u| u.side == side) {
            return Err(LegalityError::FriendlyOccupied(to));
        }

        Ok(())
    }

    /// Legal targets for the unit at `from`, ascending
    pub fn targets(&self, board: &Board, side: Side, from: Hex) -> Vec<Hex> {
        let extent = board.extent();
        extent
            .hexes()
            .filter(|to| from.distance_to(*to) <= self.move_range)
            .filter(|to| self.check(board, side, from, *to).is_ok())
            .collect()
    }

    /// Predict a fight between two units without touching the board
    pub fn assess(&self, board: &Board, attacker: &Unit, defender: &Unit) -> CombatReport {
        let target = defender.pos;
        let mut modifiers = Vec::new();

        if self.combat.river_penalty > 0 && board.borders_terrain(target, Terrain::River) {
            modifiers.push(Modifier {
                kind: ModifierKind::RiverBank,
                delta: -(self.combat.river_penalty as i32),
            });
        }
        if self.combat.mountain_penalty > 0 && board.borders_terrain(target, Terrain::Mountain) {
            modifiers.push(Modifier {
                kind: ModifierKind::HighGround,
                delta: -(self.combat.mountain_penalty as i32),
            });
        }
        if self.combat.exposed_bonus > 0 && is_exposed(board, target, defender.side) {
            modifiers.push(Modifier {
                kind: ModifierKind::ExposedDefender,
                delta: self.combat.exposed_bonus as i32,
            });
        }

        let attacker_effective = attacker.strength as i64
            + modifiers.iter().map(|m| m.delta as i64).sum::<i64>();
        let defender_strength = defender.strength;
        let gap = (attacker_effective - defender_strength as i64).unsigned_abs();

        let (winner, survivor) = if attacker_effective > defender_strength as i64 {
            (attacker.side, attacker)
        } else {
            (defender.side, defender)
        };

        CombatReport {
            attacker: attacker.side,
            attacker_strength: attacker.strength,
            defender_strength,
            modifiers,
            attacker_effective,
            winner,
            survivor_strength: u32::try_from(gap)
                .unwrap_or(u32::MAX)
                .min(survivor.strength)
                .max(1),
        }
    }

    /// Validate then apply `mv` for `side`. A rejected move leaves the board untouched.
    pub fn resolve(
        &self,
        board: &mut Board,
        side: Side,
        mv: Move,
    ) -> Result<Outcome, LegalityError> {
        let (from, to) = match mv {
            Move::Pass => return Ok(Outcome::pass()),
            Move::Movement { from, to } => (from, to),
        };

        self.check(board, side, from, to)?;
        let attacker = *board.unit_at(from).ok_or(LegalityError::NoUnit(from))?;

        let Some(defender) = board.unit_at(to).copied() else {
            board.relocate_unit(from, to);
            let captured = if board.owner(to) != Some(side) {
                board.set_owner(to, side);
                Some(to)
            } else {
                None
            };
            return Ok(Outcome {
                moved: true,
                captured,
                ..Outcome::default()
            });
        };

        let report = self.assess(board, &attacker, &defender);

        if report.attacker_wins() {
            let casualty = board.remove_unit(to);
            board.relocate_unit(from, to);
            if let Some(unit) = board.unit_mut(to) {
                unit.strength = report.survivor_strength;
            }
            board.set_owner(to, side);
            Ok(Outcome {
                moved: true,
                combat_occurred: true,
                winner: Some(side),
                captured: Some(to),
                casualty,
                report: Some(report),
            })
        } else {
            let casualty = board.remove_unit(from);
            if let Some(unit) = board.unit_mut(to) {
                unit.strength = report.survivor_strength;
            }
            Ok(Outcome {
                moved: false,
                combat_occurred: true,
                winner: Some(defender.side),
                captured: None,
                casualty,
                report: Some(report),
            })
        }
    }
}

/// A cell cut off from its side's supply is exposed. So is a frontline cell
/// (one bordering enemy territory) with fewer than two friendly neighbors.
pub fn is_exposed(board: &Board, hex: Hex, side: Side) -> bool {
    if !board.supply_reach(side).contains(&hex) {
        return true;
    }
    is_frontline(board, hex, side) && board.friendly_neighbors(hex, side) < 2
}

/// `hex` borders at least one cell owned by the opponent of `side`
pub fn is_frontline(board: &Board, hex: Hex, side: Side) -> bool {
    let enemy = side.opponent();
    board.neighbors(hex).any(|n| board.owner(n) == Some(enemy))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Extent;

    const ATTACKER: Hex = Hex::new(2, 1);
    const DEFENDER: Hex = Hex::new(3, 1);

    fn open_board() -> Board {
        let extent = Extent::new(6, 6);
        let (player, cpu) = extent.opposite_corners();
        Board::new(extent, player, cpu).unwrap()
    }

    /// Give the defender two friendly neighbors and a supply line to the CPU base
    fn support_defender(board: &mut Board) {
        for hex in [Hex::new(5, 2), Hex::new(4, 2), Hex::new(4, 1), Hex::new(3, 2)] {
            board.set_owner(hex, Side::Cpu);
        }
    }

    fn flat() -> CombatResolver {
        CombatResolver::new(1, CombatConfig::flat())
    }

    fn attack() -> Move {
        Move::Movement {
            from: ATTACKER,
            to: DEFENDER,
        }
    }

    #[test]
    fn test_pure_move_claims_unowned_cell() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        let outcome = flat().resolve(&mut board, Side::Player, attack()).unwrap();
        assert!(outcome.moved);
        assert!(!outcome.combat_occurred);
        assert_eq!(outcome.captured, Some(DEFENDER));
        assert_eq!(board.owner(DEFENDER), Some(Side::Player));
        assert_eq!(board.owner(ATTACKER), Some(Side::Player));
        assert!(board.unit_at(ATTACKER).is_none());
    }

    #[test]
    fn test_move_within_own_territory_captures_nothing() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        board.set_owner(DEFENDER, Side::Player);
        let outcome = flat().resolve(&mut board, Side::Player, attack()).unwrap();
        assert!(outcome.moved);
        assert_eq!(outcome.captured, None);
    }

    #[test]
    fn test_empty_enemy_cell_is_captured() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        board.set_owner(DEFENDER, Side::Cpu);
        let outcome = flat().resolve(&mut board, Side::Player, attack()).unwrap();
        assert!(!outcome.combat_occurred);
        assert_eq!(outcome.captured, Some(DEFENDER));
        assert_eq!(board.owner(DEFENDER), Some(Side::Player));
    }

    #[test]
    fn test_stronger_attacker_wins() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 5).unwrap();
        board.place_unit(Side::Cpu, DEFENDER, 2).unwrap();
        let outcome = flat().resolve(&mut board, Side::Player, attack()).unwrap();

        assert!(outcome.moved);
        assert!(outcome.combat_occurred);
        assert_eq!(outcome.winner, Some(Side::Player));
        assert_eq!(outcome.captured, Some(DEFENDER));
        assert_eq!(outcome.casualty.map(|u| u.side), Some(Side::Cpu));
        let survivor = board.unit_at(DEFENDER).unwrap();
        assert_eq!(survivor.side, Side::Player);
        assert_eq!(survivor.strength, 3);
        assert_eq!(board.owner(DEFENDER), Some(Side::Player));
        assert_eq!(board.unit_count(Side::Cpu), 0);
    }

    #[test]
    fn test_tie_holds_for_defender() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        board.place_unit(Side::Cpu, DEFENDER, 3).unwrap();
        let outcome = flat().resolve(&mut board, Side::Player, attack()).unwrap();

        assert!(!outcome.moved);
        assert_eq!(outcome.winner, Some(Side::Cpu));
        assert_eq!(outcome.captured, None);
        assert!(board.unit_at(ATTACKER).is_none());
        assert_eq!(board.unit_at(DEFENDER).map(|u| u.strength), Some(1));
        assert_eq!(board.owner(DEFENDER), Some(Side::Cpu));
    }

    #[test]
    fn test_terrain_penalties_turn_the_fight() {
        let mut board = open_board();
        support_defender(&mut board);
        board.set_terrain(Hex::new(3, 0), Terrain::River);
        board.set_terrain(Hex::new(2, 2), Terrain::Mountain);
        board.place_unit(Side::Player, ATTACKER, 4).unwrap();
        board.place_unit(Side::Cpu, DEFENDER, 3).unwrap();

        let resolver = CombatResolver::new(1, CombatConfig::default());
        let attacker = *board.unit_at(ATTACKER).unwrap();
        let defender = *board.unit_at(DEFENDER).unwrap();
        let report = resolver.assess(&board, &attacker, &defender);
        let kinds: Vec<ModifierKind> = report.modifiers.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![ModifierKind::RiverBank, ModifierKind::HighGround]);
        assert_eq!(report.attacker_effective, 2);
        assert!(!report.attacker_wins());

        let outcome = resolver.resolve(&mut board, Side::Player, attack()).unwrap();
        assert_eq!(outcome.winner, Some(Side::Cpu));
        assert_eq!(board.unit_at(DEFENDER).map(|u| u.strength), Some(1));
    }

    #[test]
    fn test_cut_off_defender_is_exposed() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        board.place_unit(Side::Cpu, DEFENDER, 3).unwrap();
        assert!(is_exposed(&board, DEFENDER, Side::Cpu));

        let resolver = CombatResolver::new(1, CombatConfig::default());
        let outcome = resolver.resolve(&mut board, Side::Player, attack()).unwrap();
        assert_eq!(outcome.winner, Some(Side::Player));
        let report = outcome.report.unwrap();
        assert_eq!(report.modifiers[0].kind, ModifierKind::ExposedDefender);
        assert_eq!(report.survivor_strength, 1);
    }

    #[test]
    fn test_supported_defender_is_not_exposed() {
        let mut board = open_board();
        support_defender(&mut board);
        board.place_unit(Side::Cpu, DEFENDER, 3).unwrap();
        assert!(!is_exposed(&board, DEFENDER, Side::Cpu));
    }

    #[test]
    fn test_only_frontline_cells_are_exposed() {
        let mut board = open_board();
        for hex in [Hex::new(5, 2), Hex::new(4, 2), Hex::new(3, 2)] {
            board.set_owner(hex, Side::Cpu);
        }
        board.place_unit(Side::Cpu, DEFENDER, 3).unwrap();
        assert_eq!(board.friendly_neighbors(DEFENDER, Side::Cpu), 1);
        assert!(!is_frontline(&board, DEFENDER, Side::Cpu));
        assert!(!is_exposed(&board, DEFENDER, Side::Cpu));

        // Attacked from two cells away, behind no front
        let far = Hex::new(1, 1);
        board.place_unit(Side::Player, far, 3).unwrap();
        let resolver = CombatResolver::new(2, CombatConfig::default());
        let outcome = resolver
            .resolve(&mut board, Side::Player, Move::movement(far, DEFENDER))
            .unwrap();
        assert_eq!(outcome.winner, Some(Side::Cpu));
        assert!(outcome.report.unwrap().modifiers.is_empty());

        board.set_owner(ATTACKER, Side::Player);
        assert!(is_frontline(&board, DEFENDER, Side::Cpu));
        assert!(is_exposed(&board, DEFENDER, Side::Cpu));
    }

    #[test]
    fn test_legality_errors_leave_board_untouched() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        board.place_unit(Side::Player, Hex::new(2, 2), 3).unwrap();
        board.place_unit(Side::Cpu, Hex::new(4, 0), 3).unwrap();
        board.set_terrain(Hex::new(1, 2), Terrain::Mountain);
        let before = board.clone();
        let resolver = flat();

        let cases = [
            (Hex::new(0, 4), DEFENDER, LegalityError::NoUnit(Hex::new(0, 4))),
            (
                Hex::new(4, 0),
                DEFENDER,
                LegalityError::NotOwnUnit {
                    hex: Hex::new(4, 0),
                    side: Side::Player,
                },
            ),
            (ATTACKER, ATTACKER, LegalityError::SameCell(ATTACKER)),
            (
                ATTACKER,
                Hex::new(4, 1),
                LegalityError::OutOfRange {
                    from: ATTACKER,
                    to: Hex::new(4, 1),
                    distance: 2,
                    range: 1,
                },
            ),
            (
                ATTACKER,
                Hex::new(1, 2),
                LegalityError::Impassable {
                    hex: Hex::new(1, 2),
                    terrain: Terrain::Mountain,
                },
            ),
            (ATTACKER, Hex::new(2, 2), LegalityError::FriendlyOccupied(Hex::new(2, 2))),
            (Hex::new(-4, 0), ATTACKER, LegalityError::OutOfExtent(Hex::new(-4, 0))),
        ];

        for (from, to, expected) in cases {
            let result = resolver.resolve(&mut board, Side::Player, Move::Movement { from, to });
            assert_eq!(result, Err(expected));
            assert_eq!(board, before);
        }
    }

    #[test]
    fn test_targets() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        board.place_unit(Side::Player, Hex::new(2, 2), 3).unwrap();
        let targets = flat().targets(&board, Side::Player, ATTACKER);
        assert_eq!(targets.len(), 5);
        assert!(!targets.contains(&Hex::new(2, 2)));
        assert!(targets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_targets_with_unbounded_range() {
        let mut board = open_board();
        board.place_unit(Side::Player, ATTACKER, 3).unwrap();
        let resolver = CombatResolver::new(u32::MAX, CombatConfig::flat());
        let targets = resolver.targets(&board, Side::Player, ATTACKER);
        assert_eq!(targets.len(), board.extent().len() - 1);
        assert!(targets.contains(&board.cpu_base()));
        assert!(targets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pass_is_noop() {
        let mut board = open_board();
        let before = board.clone();
        let outcome = flat().resolve(&mut board, Side::Cpu, Move::Pass).unwrap();
        assert_eq!(outcome, Outcome::pass());
        assert_eq!(board, before);
    }
}
