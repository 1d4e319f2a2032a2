//! Engine-wide invariants under random legal playouts: card conservation,
//! prize accounting, stack discipline, legality closure, determinism, and
//! clone independence.

mod common;

use proptest::prelude::*;

use ptcg_engine::core::{ActionKind, CardDefId, PlayerId};
use ptcg_engine::{Engine, GameState};

fn test_deck() -> Vec<CardDefId> {
    let mut deck = Vec::new();
    let mut add = |key: &str, n: usize| {
        for _ in 0..n {
            deck.push(CardDefId(key.to_string()));
        }
    };
    add("charmander", 8);
    add("pidgey", 8);
    add("snorlax", 4);
    add("klefki", 2);
    add("charmeleon", 4);
    add("charizard-ex", 2);
    add("nest-ball", 4);
    add("ultra-ball", 2);
    add("buddy-buddy-poffin", 2);
    add("rare-candy", 2);
    add("iono", 2);
    add("boss-orders", 2);
    add("area-zero", 2);
    add("fire-energy", 16);
    assert_eq!(deck.len(), 60);
    deck
}

fn fresh_game(engine: &Engine, seed: u64) -> GameState {
    let deck = test_deck();
    let mut state = engine
        .create_game(&deck, &deck, seed)
        .expect("decks only use known definitions");
    engine.setup_initial_board(&mut state);
    state
}

/// Drive one choice through the engine, panicking on anything the engine
/// itself claims is legal but rejects.
fn play_one(engine: &Engine, state: &mut GameState, choice: usize) -> bool {
    let actions = engine.legal_actions(state);
    if actions.is_empty() {
        return false;
    }
    let action = actions[choice % actions.len()].clone();
    engine
        .step_inplace(state, &action)
        .expect("legal actions must apply cleanly");
    true
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// No card is ever created or destroyed, prizes stay accounted, and a
    /// pending resolution step narrows the action set to stack choices.
    #[test]
    fn random_playouts_hold_invariants(
        seed in 0u64..1_000,
        choices in proptest::collection::vec(0usize..64, 60),
    ) {
        let engine = common::engine();
        let mut state = fresh_game(&engine, seed);
        prop_assert_eq!(state.total_cards(), 120);

        for &choice in &choices {
            if state.is_game_over() {
                break;
            }
            let actions = engine.legal_actions(&state);
            prop_assert!(!actions.is_empty(), "live game must offer actions");

            if state.has_pending_steps() {
                prop_assert!(actions.iter().all(|a| matches!(
                    a.kind,
                    ActionKind::SelectCard | ActionKind::ConfirmSelection | ActionKind::Evolve
                )));
            }

            let action = actions[choice % actions.len()].clone();
            engine
                .step_inplace(&mut state, &action)
                .expect("legal actions must apply cleanly");

            prop_assert_eq!(state.total_cards(), 120);
            let ids = state.all_card_ids();
            let unique: std::collections::HashSet<_> = ids.iter().collect();
            prop_assert_eq!(ids.len(), unique.len(), "instance ids must stay unique");
            for p in [PlayerId::ZERO, PlayerId::ONE] {
                prop_assert_eq!(
                    state.player(p).prizes.count() + state.player(p).prizes_taken as usize,
                    6
                );
            }
        }
    }

    /// Every action in `legal_actions` applies without error on a copy.
    #[test]
    fn legality_closure(
        seed in 0u64..1_000,
        choices in proptest::collection::vec(0usize..64, 20),
    ) {
        let engine = common::engine();
        let mut state = fresh_game(&engine, seed);

        for &choice in &choices {
            if state.is_game_over() {
                break;
            }
            for action in engine.legal_actions(&state) {
                prop_assert!(
                    engine.step(&state, &action).is_ok(),
                    "offered action failed: {:?}",
                    action.kind
                );
            }
            if !play_one(&engine, &mut state, choice) {
                break;
            }
        }
    }

    /// The same seed and the same choices produce identical states.
    #[test]
    fn same_seed_replays_identically(
        seed in 0u64..1_000,
        choices in proptest::collection::vec(0usize..64, 40),
    ) {
        let engine = common::engine();
        let mut a = fresh_game(&engine, seed);
        let mut b = fresh_game(&engine, seed);
        prop_assert_eq!(&a, &b);

        for &choice in &choices {
            if a.is_game_over() {
                break;
            }
            play_one(&engine, &mut a, choice);
            play_one(&engine, &mut b, choice);
            prop_assert_eq!(&a, &b);
        }
    }
}

/// `step` never mutates its input, and a clone is independent of the
/// original.
#[test]
fn step_is_pure_and_clones_are_independent() {
    let engine = common::engine();
    let state = fresh_game(&engine, 11);
    let snapshot = state.clone();

    let actions = engine.legal_actions(&state);
    assert!(!actions.is_empty());
    let next = engine.step(&state, &actions[0]).expect("legal action");

    assert_eq!(state, snapshot);
    assert_ne!(next, state);
}

/// Action history records every applied action, in order.
#[test]
fn move_history_grows_per_step() {
    let engine = common::engine();
    let mut state = fresh_game(&engine, 3);
    let before = state.move_history.len();

    for choice in 0..10 {
        if state.is_game_over() {
            break;
        }
        play_one(&engine, &mut state, choice);
    }
    assert!(state.move_history.len() > before);
}
