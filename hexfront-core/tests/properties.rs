//! Property tests for geometry, generation and the turn engine

use proptest::prelude::*;

use hexfront_core::{
    generate, CpuStrategy, EngineError, Extent, GenerationFailure, Hex, LegalityError, MatchConfig,
    Move, Side, Terrain, TurnEngine,
};

// ============================================================================
// STRATEGIES
// ============================================================================

fn arb_hex() -> impl Strategy<Value = Hex> {
    (-40i32..40, -40i32..40).prop_map(|(q, r)| Hex::new(q, r))
}

/// Anywhere on the `i32` plane, edges included
fn arb_plane_hex() -> impl Strategy<Value = Hex> {
    let coord = prop_oneof![
        2 => any::<i32>(),
        1 => prop_oneof![Just(i32::MIN), Just(i32::MIN + 1), Just(i32::MAX - 1), Just(i32::MAX)],
    ];
    (coord.clone(), coord).prop_map(|(q, r)| Hex::new(q, r))
}

/// Coordinates around and slightly outside a small board
fn arb_board_hex() -> impl Strategy<Value = Hex> {
    (-2i32..9, -5i32..9).prop_map(|(q, r)| Hex::new(q, r))
}

fn arb_move() -> impl Strategy<Value = Move> {
    prop_oneof![
        1 => Just(Move::Pass),
        9 => (arb_board_hex(), arb_board_hex()).prop_map(|(from, to)| Move::movement(from, to)),
    ]
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Player), Just(Side::Cpu)]
}

fn arb_size() -> impl Strategy<Value = (u32, u32)> {
    (5u32..=12, 5u32..=12)
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn neighbors_are_six_distinct_adjacent_hexes(c in arb_hex()) {
        let neighbors = c.neighbors();
        prop_assert_eq!(c.distance_to(c), 0);
        for (i, n) in neighbors.iter().enumerate() {
            prop_assert_eq!(c.distance_to(*n), 1);
            prop_assert!(!neighbors[i + 1..].contains(n));
        }
    }

    #[test]
    fn distance_is_a_metric(a in arb_hex(), b in arb_hex(), c in arb_hex()) {
        prop_assert_eq!(a.distance_to(b), b.distance_to(a));
        prop_assert!(a.distance_to(c) <= a.distance_to(b) + b.distance_to(c));
        prop_assert_eq!(a.distance_to(b) == 0, a == b);
    }

    #[test]
    fn geometry_is_total_over_the_plane(a in arb_plane_hex(), b in arb_plane_hex()) {
        prop_assert_eq!(a.distance_to(a), 0);
        prop_assert_eq!(a.distance_to(b), b.distance_to(a));
        prop_assert_eq!(a.distance_to(b) == 0, a == b);

        let neighbors = a.neighbors();
        for (i, n) in neighbors.iter().enumerate() {
            prop_assert!(!neighbors[i + 1..].contains(n));
        }
        let interior = |c: i32| c > i32::MIN && c < i32::MAX;
        if interior(a.q) && interior(a.r) {
            prop_assert!(neighbors.iter().all(|n| a.is_adjacent(*n)));
        }

        let extent = Extent::new(8, 7);
        prop_assert_eq!(extent.contains(a), extent.index_of(a).is_some());
    }

    #[test]
    fn far_coordinates_are_rejected_not_fatal(
        seed in any::<u64>(),
        from in arb_plane_hex(),
        to in arb_plane_hex(),
    ) {
        let Ok(mut engine) = TurnEngine::start(&MatchConfig::new(6, 6, seed)) else {
            return Ok(());
        };
        let board = engine.board().clone();
        if !board.contains(from) {
            prop_assert_eq!(
                engine.apply(Side::Player, Move::movement(from, to)),
                Err(EngineError::Illegal(LegalityError::OutOfExtent(from)))
            );
            prop_assert_eq!(engine.board(), &board);
        }
    }

    #[test]
    fn generation_is_deterministic((width, height) in arb_size(), seed in any::<u64>()) {
        prop_assert_eq!(generate(width, height, seed), generate(width, height, seed));
    }

    #[test]
    fn generated_bases_stay_connected((width, height) in arb_size(), seed in any::<u64>()) {
        match generate(width, height, seed) {
            Ok(board) => {
                prop_assert!(board.bases_connected());
                for side in Side::ALL {
                    let base = board.base_of(side);
                    prop_assert_eq!(board.terrain(base), Some(Terrain::Plain));
                    prop_assert_eq!(board.owner(base), Some(side));
                }
            }
            Err(err) => {
                let exhausted = matches!(err, GenerationFailure::RetriesExhausted { .. });
                prop_assert!(exhausted);
            }
        }
    }

    #[test]
    fn cpu_moves_are_legal_and_never_add_units(seed in any::<u64>(), halves in 1usize..60) {
        let config = MatchConfig::new(8, 7, seed);
        let Ok(mut engine) = TurnEngine::start(&config) else {
            return Ok(());
        };
        let mut strategy = CpuStrategy::new(&config.rules).with_seed(seed);

        for _ in 0..halves {
            if engine.is_over() {
                break;
            }
            let side = engine.state().active;
            let mv = strategy.select_move(engine.board(), side);
            if let Move::Movement { from, to } = mv {
                prop_assert!(engine.resolver().check(engine.board(), side, from, to).is_ok());
            }

            let before = engine.board().total_units();
            prop_assert!(engine.apply(side, mv).is_ok());
            prop_assert!(engine.board().total_units() <= before);
        }
    }

    #[test]
    fn rejected_moves_change_nothing(
        seed in any::<u64>(),
        attempts in proptest::collection::vec((arb_side(), arb_move()), 1..40),
    ) {
        let Ok(mut engine) = TurnEngine::start(&MatchConfig::new(6, 6, seed)) else {
            return Ok(());
        };

        for (side, mv) in attempts {
            let board = engine.board().clone();
            let state = engine.state();
            let units = board.total_units();

            match engine.apply(side, mv) {
                Ok(_) => {
                    prop_assert!(engine.board().total_units() <= units);
                }
                Err(_) => {
                    prop_assert_eq!(engine.board(), &board);
                    prop_assert_eq!(engine.state(), state);
                }
            }
        }
    }
}
