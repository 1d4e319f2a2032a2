//! Boundary behaviors of the turn rules: first-turn restrictions,
//! once-per-turn flags, stadium rules, status locks, and win conditions.

mod common;

use ptcg_engine::core::{Action, ActionKind, GamePhase, PlayerId, StatusCondition};
use ptcg_engine::CardId;

/// The player going first cannot attack, play a supporter, or evolve on
/// their first turn.
#[test]
fn first_turn_restrictions_for_starting_player() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.turn_count = 1;
    state.starting_player = PlayerId::ZERO;
    common::power_up_active(&mut state, PlayerId::ZERO, 2);
    state.players[0]
        .hand
        .add_card(common::in_zone("iono", "p0_iono", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("charmeleon", "p0_meleon", PlayerId::ZERO));

    let actions = engine.legal_actions(&state);
    assert!(actions.iter().any(|a| a.kind == ActionKind::EndTurn));
    assert!(!actions.iter().any(|a| a.kind == ActionKind::Attack));
    assert!(!actions.iter().any(|a| a.kind == ActionKind::PlaySupporter));
    assert!(!actions.iter().any(|a| a.kind == ActionKind::Evolve));
}

/// The same restrictions lift from turn 2 on.
#[test]
fn restrictions_lift_on_later_turns() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    common::power_up_active(&mut state, PlayerId::ZERO, 2);
    state.players[0]
        .hand
        .add_card(common::in_zone("iono", "p0_iono", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("charmeleon", "p0_meleon", PlayerId::ZERO));

    let actions = engine.legal_actions(&state);
    assert!(actions.iter().any(|a| a.kind == ActionKind::Attack));
    assert!(actions.iter().any(|a| a.kind == ActionKind::PlaySupporter));
    assert!(actions.iter().any(|a| a.kind == ActionKind::Evolve));
}

/// A stadium with the same name as the one in play cannot be played.
#[test]
fn same_name_stadium_is_blocked() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.stadium = Some(common::in_zone("area-zero", "stadium0", PlayerId::ONE));
    state.players[0]
        .hand
        .add_card(common::in_zone("area-zero", "p0_stadium", PlayerId::ZERO));

    let actions = engine.legal_actions(&state);
    assert!(!actions.iter().any(|a| a.kind == ActionKind::PlayStadium));
}

/// Asleep and Paralyzed both lock retreat and attack.
#[test]
fn sleep_locks_retreat_and_attack() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    common::power_up_active(&mut state, PlayerId::ZERO, 2);
    state.players[0]
        .board
        .bench
        .push(common::in_play(engine.database(), "snorlax", "p0_bench", PlayerId::ZERO));

    let before = engine.legal_actions(&state);
    assert!(before.iter().any(|a| a.kind == ActionKind::Retreat));
    assert!(before.iter().any(|a| a.kind == ActionKind::Attack));

    if let Some(active) = state.players[0].board.active.as_mut() {
        active.add_status(StatusCondition::Asleep);
    }
    let after = engine.legal_actions(&state);
    assert!(!after.iter().any(|a| a.kind == ActionKind::Retreat));
    assert!(!after.iter().any(|a| a.kind == ActionKind::Attack));
}

/// Only one energy may be attached per turn.
#[test]
fn one_energy_attachment_per_turn() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("fire-energy", "p0_e0", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("fire-energy", "p0_e1", PlayerId::ZERO));

    let attach = engine
        .legal_actions(&state)
        .into_iter()
        .find(|a| a.kind == ActionKind::AttachEnergy)
        .expect("attachment should be offered");
    engine.step_inplace(&mut state, &attach).expect("legal attach");

    assert!(state.players[0].energy_attached_this_turn);
    assert!(!engine
        .legal_actions(&state)
        .iter()
        .any(|a| a.kind == ActionKind::AttachEnergy));
}

/// An illegal action is rejected and leaves the state untouched.
#[test]
fn illegal_action_leaves_state_unchanged() {
    let engine = common::engine();
    let state = common::battle_state(&engine);
    // No energy attached, so Ember is not legal.
    let attack = Action::attack(PlayerId::ZERO, CardId("p0_active".to_string()), "Ember");

    let snapshot = state.clone();
    assert!(engine.step(&state, &attack).is_err());
    assert_eq!(state, snapshot);
}

/// Drawing from an empty deck at the start of a turn loses the game.
#[test]
fn deck_out_loses() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[1].deck.cards.clear();

    let end = Action::end_turn(PlayerId::ZERO);
    engine.step_inplace(&mut state, &end).expect("legal end turn");

    assert!(state.is_game_over());
    assert_eq!(state.winner, Some(PlayerId::ZERO));
}

/// With no active Pokemon, promotion is the only choice.
#[test]
fn promotion_is_forced_without_an_active() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0].board.active = None;
    state.players[0]
        .board
        .bench
        .push(common::in_play(engine.database(), "snorlax", "p0_bench", PlayerId::ZERO));

    let actions = engine.legal_actions(&state);
    assert!(!actions.is_empty());
    assert!(actions.iter().all(|a| a.kind == ActionKind::PromoteActive));

    engine
        .step_inplace(&mut state, &actions[0])
        .expect("legal promotion");
    assert!(state.players[0].board.active.is_some());
    assert!(state.players[0].board.bench.is_empty());
}

/// EndTurn hands the turn over, increments the turn counter, and the next
/// player draws one.
#[test]
fn end_turn_passes_and_draws() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    let p1_deck_before = state.players[1].deck.count();

    engine
        .step_inplace(&mut state, &Action::end_turn(PlayerId::ZERO))
        .expect("legal end turn");

    assert_eq!(state.active_player, PlayerId::ONE);
    assert_eq!(state.turn_count, 3);
    assert_eq!(state.phase, GamePhase::Main);
    assert_eq!(state.players[1].deck.count(), p1_deck_before - 1);
    assert_eq!(state.players[1].hand.count(), 1);
}

/// A finished game offers no actions and rejects stepping.
#[test]
fn finished_game_is_inert() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[1].deck.cards.clear();
    engine
        .step_inplace(&mut state, &Action::end_turn(PlayerId::ZERO))
        .expect("legal end turn");

    assert!(engine.legal_actions(&state).is_empty());
    assert!(engine
        .step(&state, &Action::end_turn(PlayerId::ONE))
        .is_err());
}

/// Klefki's Mischievous Lock blocks other Basics' abilities only while
/// Klefki is active.
#[test]
fn klefki_lock_blocks_basic_abilities() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    state.players[1].board.active = Some(common::in_play(db, "klefki", "p1_klefki", PlayerId::ONE));

    let basic = state.players[0].board.active.clone().expect("active set");
    assert!(engine
        .registry()
        .is_ability_blocked(&state, db, &basic, "Some Ability"));

    let evolved = common::in_play(db, "charmeleon", "p0_meleon", PlayerId::ZERO);
    assert!(!engine
        .registry()
        .is_ability_blocked(&state, db, &evolved, "Some Ability"));

    // Benched Klefki does not lock.
    let klefki = state.players[1].board.active.take().expect("klefki");
    state.players[1].board.bench.push(klefki);
    state.players[1].board.active = Some(common::in_play(db, "pidgey", "p1_active2", PlayerId::ONE));
    assert!(!engine
        .registry()
        .is_ability_blocked(&state, db, &basic, "Some Ability"));
}
