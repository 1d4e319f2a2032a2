//! End-to-end card scenarios: one per handler pattern, exercised through
//! `legal_actions` and `step_inplace` only.

mod common;

use ptcg_engine::core::{Action, ActionKind, PlayerId, ZoneKind};
use ptcg_engine::{CardId, ResolutionStep};

fn select_first_pending(engine: &ptcg_engine::Engine, state: &mut ptcg_engine::GameState) {
    let action = engine
        .legal_actions(state)
        .into_iter()
        .find(|a| a.kind == ActionKind::SelectCard)
        .expect("a selection should be offered");
    engine.step_inplace(state, &action).expect("legal selection");
}

/// Nest Ball pushes a search-to-bench step; picking a Basic benches it and
/// shuffles, and confirming with nothing found just shuffles.
#[test]
fn nest_ball_searches_basic_to_bench() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("nest-ball", "p0_nest", PlayerId::ZERO));
    state.players[0]
        .deck
        .add_card(common::in_zone("charmander", "p0_target", PlayerId::ZERO));

    let play = Action::play_item(PlayerId::ZERO, CardId("p0_nest".to_string()));
    engine.step_inplace(&mut state, &play).expect("legal item");

    match state.resolution_stack.last().expect("pending step") {
        ResolutionStep::SearchDeck {
            count,
            min_count,
            destination,
            shuffle_after,
            ..
        } => {
            assert_eq!(*count, 1);
            assert_eq!(*min_count, 0);
            assert_eq!(*destination, ZoneKind::Bench);
            assert!(*shuffle_after);
        }
        other => panic!("expected a deck search, got {other:?}"),
    }

    // Only the Basic is offered; energies do not match the filter.
    let select = Action::select_card(PlayerId::ZERO, CardId("p0_target".to_string()));
    assert!(engine.legal_actions(&state).contains(&select));
    engine.step_inplace(&mut state, &select).expect("legal selection");

    assert!(!state.has_pending_steps());
    assert_eq!(state.players[0].board.bench.len(), 1);
    assert_eq!(state.players[0].board.bench[0].id.0, "p0_target");
    assert!(state.players[0].board.bench[0].current_hp > 0);
    assert_eq!(state.players[0].discard.cards[0].id.0, "p0_nest");
}

/// Fail-to-find: confirming a Nest Ball search with zero picks is legal.
#[test]
fn nest_ball_fail_to_find() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("nest-ball", "p0_nest", PlayerId::ZERO));

    let play = Action::play_item(PlayerId::ZERO, CardId("p0_nest".to_string()));
    engine.step_inplace(&mut state, &play).expect("legal item");

    let confirm = Action::confirm_selection(PlayerId::ZERO);
    assert!(engine.legal_actions(&state).contains(&confirm));
    engine.step_inplace(&mut state, &confirm).expect("legal confirm");

    assert!(!state.has_pending_steps());
    assert!(state.players[0].board.bench.is_empty());
}

/// Ultra Ball discards two hand cards first, then searches for a Pokemon.
#[test]
fn ultra_ball_discards_then_searches() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("ultra-ball", "p0_ball", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("fire-energy", "p0_h0", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("water-energy", "p0_h1", PlayerId::ZERO));
    state.players[0]
        .deck
        .add_card(common::in_zone("snorlax", "p0_lax", PlayerId::ZERO));

    let play = Action::play_item(PlayerId::ZERO, CardId("p0_ball".to_string()));
    engine.step_inplace(&mut state, &play).expect("legal item");

    match state.resolution_stack.last().expect("pending step") {
        ResolutionStep::SelectFromZone {
            zone, exact_count, ..
        } => {
            assert_eq!(*zone, ZoneKind::Hand);
            assert_eq!(*exact_count, Some(2));
        }
        other => panic!("expected a hand selection, got {other:?}"),
    }

    // Both discards; the second pick auto-completes the step and the
    // callback pushes the deck search.
    select_first_pending(&engine, &mut state);
    select_first_pending(&engine, &mut state);

    assert!(state.players[0].hand.is_empty());
    assert!(matches!(
        state.resolution_stack.last(),
        Some(ResolutionStep::SearchDeck { .. })
    ));

    let select = Action::select_card(PlayerId::ZERO, CardId("p0_lax".to_string()));
    engine.step_inplace(&mut state, &select).expect("legal selection");

    assert!(!state.has_pending_steps());
    assert_eq!(state.players[0].hand.cards[0].id.0, "p0_lax");
    // Ultra Ball plus the two discards.
    assert_eq!(state.players[0].discard.count(), 3);
}

/// Ultra Ball is not offered when the hand cannot supply two discards.
#[test]
fn ultra_ball_requires_two_other_cards() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("ultra-ball", "p0_ball", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("fire-energy", "p0_h0", PlayerId::ZERO));

    assert!(!engine
        .legal_actions(&state)
        .iter()
        .any(|a| a.kind == ActionKind::PlayItem));
}

/// Boss's Orders offers one action per opponent bench target and swaps
/// the chosen one in.
#[test]
fn boss_orders_gusts_the_chosen_target() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    state.players[1]
        .board
        .bench
        .push(common::in_play(db, "snorlax", "p1_x", PlayerId::ONE));
    state.players[1]
        .board
        .bench
        .push(common::in_play(db, "klefki", "p1_y", PlayerId::ONE));
    state.players[0]
        .hand
        .add_card(common::in_zone("boss-orders", "p0_boss", PlayerId::ZERO));

    let offers: Vec<Action> = engine
        .legal_actions(&state)
        .into_iter()
        .filter(|a| a.kind == ActionKind::PlaySupporter)
        .collect();
    assert_eq!(offers.len(), 2);

    let pick_x = offers
        .iter()
        .find(|a| a.target_id.as_ref().map(|t| t.0.as_str()) == Some("p1_x"))
        .expect("X should be a target");
    engine.step_inplace(&mut state, pick_x).expect("legal supporter");

    assert_eq!(state.players[1].board.active.as_ref().map(|a| a.id.0.as_str()), Some("p1_x"));
    assert!(state.players[1].board.bench.iter().any(|p| p.id.0 == "p1_active"));
    assert!(state.players[0].supporter_played_this_turn);
}

/// Rare Candy evolves a Basic straight to the Stage 2, preserving damage,
/// attachments and tenure.
#[test]
fn rare_candy_skips_a_stage() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    common::power_up_active(&mut state, PlayerId::ZERO, 1);
    if let Some(active) = state.players[0].board.active.as_mut() {
        active.damage_counters = 2;
    }
    state.players[0]
        .hand
        .add_card(common::in_zone("rare-candy", "p0_candy", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("charizard-ex", "p0_zard", PlayerId::ZERO));

    let offer = engine
        .legal_actions(&state)
        .into_iter()
        .find(|a| {
            a.kind == ActionKind::PlayItem
                && a.target_id.as_ref().map(|t| t.0.as_str()) == Some("p0_active")
        })
        .expect("the (Basic, Stage 2) pair should be offered");
    engine.step_inplace(&mut state, &offer).expect("legal item");

    let active = state.players[0].board.active.as_ref().expect("active");
    assert_eq!(active.card_def_id.0, "charizard-ex");
    assert_eq!(active.damage_counters, 2);
    assert_eq!(active.turns_in_play, 1);
    assert_eq!(active.attached_energy.len(), 1);
    assert!(active.evolved_this_turn);
    assert_eq!(active.previous_stages.len(), 1);
    assert!(state.players[0].hand.is_empty());
}

/// Rare Candy is not offered on a Basic benched this turn.
#[test]
fn rare_candy_respects_tenure() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    if let Some(active) = state.players[0].board.active.as_mut() {
        active.turns_in_play = 0;
    }
    state.players[0]
        .hand
        .add_card(common::in_zone("rare-candy", "p0_candy", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("charizard-ex", "p0_zard", PlayerId::ZERO));

    assert!(!engine
        .legal_actions(&state)
        .iter()
        .any(|a| a.kind == ActionKind::PlayItem));
}

/// Two Rare Candy pairs onto the same Basic are distinct actions, and
/// stepping one evolves exactly the Stage 2 it names.
#[test]
fn rare_candy_choices_stay_distinct() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("rare-candy", "p0_candy", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("charizard-ex", "p0_zard1", PlayerId::ZERO));
    state.players[0]
        .hand
        .add_card(common::in_zone("charizard-ex", "p0_zard2", PlayerId::ZERO));

    let offers: Vec<Action> = engine
        .legal_actions(&state)
        .into_iter()
        .filter(|a| a.kind == ActionKind::PlayItem)
        .collect();
    assert_eq!(offers.len(), 2);
    assert_ne!(offers[0], offers[1]);

    let second = offers
        .iter()
        .find(|a| a.param("stage2") == Some("p0_zard2"))
        .expect("a pair naming the second copy");
    engine.step_inplace(&mut state, second).expect("legal item");

    let active = state.players[0].board.active.as_ref().expect("active");
    assert_eq!(active.id.0, "p0_zard2");
    assert_eq!(state.players[0].hand.count(), 1);
    assert_eq!(state.players[0].hand.cards[0].id.0, "p0_zard1");
}

/// A knockout discards the Pokemon with its attachments and awards a
/// prize to the attacker.
#[test]
fn knockout_awards_prize_and_discards_tree() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    common::power_up_active(&mut state, PlayerId::ZERO, 1);
    state.players[1]
        .board
        .bench
        .push(common::in_play(db, "snorlax", "p1_bench", PlayerId::ONE));
    if let Some(defender) = state.players[1].board.active.as_mut() {
        defender.damage_counters = 5;
        defender
            .attached_energy
            .push(common::in_zone("water-energy", "p1_we", PlayerId::ONE));
    }

    let attack = Action::attack(PlayerId::ZERO, CardId("p0_active".to_string()), "Ember");
    engine.step_inplace(&mut state, &attack).expect("legal attack");

    // Pidgey (60 HP, 50 damage) takes 30 more and is knocked out.
    assert!(state.players[1].discard.cards.iter().any(|c| c.id.0 == "p1_active"));
    assert!(state.players[1].discard.cards.iter().any(|c| c.id.0 == "p1_we"));
    assert_eq!(state.players[0].prizes_taken, 1);
    assert_eq!(state.players[0].prizes.count(), 5);
    assert_eq!(state.players[0].hand.count(), 1);

    // The turn passed; player 1 must promote before anything else.
    assert_eq!(state.active_player, PlayerId::ONE);
    let actions = engine.legal_actions(&state);
    assert!(actions.iter().all(|a| a.kind == ActionKind::PromoteActive));
}

/// Iono bottoms both hands and draws per remaining prizes.
#[test]
fn iono_resets_both_hands() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("iono", "p0_iono", PlayerId::ZERO));
    for i in 0..3 {
        state.players[0]
            .hand
            .add_card(common::in_zone("fire-energy", &format!("p0_x{i}"), PlayerId::ZERO));
    }
    for i in 0..2 {
        state.players[1]
            .hand
            .add_card(common::in_zone("fire-energy", &format!("p1_x{i}"), PlayerId::ONE));
    }

    let play = Action::play_supporter(PlayerId::ZERO, CardId("p0_iono".to_string()));
    engine.step_inplace(&mut state, &play).expect("legal supporter");

    // Six prizes each, so both draw six.
    assert_eq!(state.players[0].hand.count(), 6);
    assert_eq!(state.players[1].hand.count(), 6);
    // 10 in deck + 3 bottomed - 6 drawn / 10 + 2 - 6.
    assert_eq!(state.players[0].deck.count(), 7);
    assert_eq!(state.players[1].deck.count(), 6);
}

/// Briar pays one extra prize when a Tera Pokemon's attack knocks out the
/// opposing active, and the effect is consumed by the payout.
#[test]
fn briar_pays_extra_prize_on_tera_knockout() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    state.players[0].board.active =
        Some(common::in_play(db, "charizard-ex", "p0_zard", PlayerId::ZERO));
    common::power_up_active(&mut state, PlayerId::ZERO, 2);
    state.players[1].prizes.cards.truncate(2);
    state.players[1]
        .board
        .bench
        .push(common::in_play(db, "snorlax", "p1_bench", PlayerId::ONE));
    state.players[0]
        .hand
        .add_card(common::in_zone("briar", "p0_briar", PlayerId::ZERO));

    let play = Action::play_supporter(PlayerId::ZERO, CardId("p0_briar".to_string()));
    assert!(engine.legal_actions(&state).contains(&play));
    engine.step_inplace(&mut state, &play).expect("legal supporter");
    assert_eq!(state.active_effects.len(), 1);

    let attack = Action::attack(PlayerId::ZERO, CardId("p0_zard".to_string()), "Burning Darkness");
    engine.step_inplace(&mut state, &attack).expect("legal attack");

    // Pidgey is worth one prize; Briar adds a second.
    assert_eq!(state.players[0].prizes_taken, 2);
    assert_eq!(state.players[0].prizes.count(), 4);
    assert!(state.active_effects.is_empty());
}

/// Briar is only offered while the opponent has exactly 2 prizes left.
#[test]
fn briar_requires_two_prizes_remaining() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("briar", "p0_briar", PlayerId::ZERO));

    assert!(!engine
        .legal_actions(&state)
        .iter()
        .any(|a| a.kind == ActionKind::PlaySupporter));
}

/// Rapid Verdant locks the attacker out of attacking for one turn: the
/// lock is created by the attack, gates attack legality on the owner's
/// next turn, and expires at the end of that turn.
#[test]
fn rapid_verdant_locks_the_attacker_for_a_turn() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    state.players[0].board.active =
        Some(common::in_play(db, "iron-leaves-ex", "p0_leaves", PlayerId::ZERO));
    if let Some(active) = state.players[0].board.active.as_mut() {
        active
            .attached_energy
            .push(common::in_zone("grass-energy", "p0_ge", PlayerId::ZERO));
    }
    state.players[1].board.active =
        Some(common::in_play(db, "charizard-ex", "p1_zard", PlayerId::ONE));

    let attack = Action::attack(PlayerId::ZERO, CardId("p0_leaves".to_string()), "Rapid Verdant");
    engine.step_inplace(&mut state, &attack).expect("legal attack");

    let leaves = CardId("p0_leaves".to_string());
    assert!(state.has_effect_on("cannot_attack_next_turn", &leaves));
    let defender = state.players[1].board.active.as_ref().expect("survives");
    assert_eq!(defender.damage_counters, 22);

    // Opponent's turn passes.
    assert_eq!(state.active_player, PlayerId::ONE);
    let end = Action::end_turn(PlayerId::ONE);
    engine.step_inplace(&mut state, &end).expect("legal end turn");

    // Locked: the attack is not offered this turn.
    assert_eq!(state.active_player, PlayerId::ZERO);
    assert!(!engine
        .legal_actions(&state)
        .iter()
        .any(|a| a.kind == ActionKind::Attack));

    let end = Action::end_turn(PlayerId::ZERO);
    engine.step_inplace(&mut state, &end).expect("legal end turn");
    assert!(!state.has_effect_on("cannot_attack_next_turn", &leaves));

    let end = Action::end_turn(PlayerId::ONE);
    engine.step_inplace(&mut state, &end).expect("legal end turn");
    assert!(engine
        .legal_actions(&state)
        .iter()
        .any(|a| a.kind == ActionKind::Attack));
}

/// Dawn runs three stacked searches: Basic, then Stage 1, then Stage 2.
#[test]
fn dawn_searches_three_stages() {
    let engine = common::engine();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .hand
        .add_card(common::in_zone("dawn", "p0_dawn", PlayerId::ZERO));
    for (def, id) in [
        ("charmander", "p0_s0"),
        ("charmeleon", "p0_s1"),
        ("charizard-ex", "p0_s2"),
    ] {
        state.players[0].deck.add_card(common::in_zone(def, id, PlayerId::ZERO));
    }

    let play = Action::play_supporter(PlayerId::ZERO, CardId("p0_dawn".to_string()));
    engine.step_inplace(&mut state, &play).expect("legal supporter");
    assert_eq!(state.resolution_stack.len(), 3);

    for expected in ["p0_s0", "p0_s1", "p0_s2"] {
        let select = Action::select_card(PlayerId::ZERO, CardId(expected.to_string()));
        assert!(
            engine.legal_actions(&state).contains(&select),
            "{expected} should be searchable"
        );
        engine.step_inplace(&mut state, &select).expect("legal selection");
    }

    assert!(!state.has_pending_steps());
    assert_eq!(state.players[0].hand.count(), 3);
}

/// Prime Catcher switches the chosen opponent Pokemon in, then asks for
/// the player's own switch.
#[test]
fn prime_catcher_switches_both_sides() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    state.players[0]
        .board
        .bench
        .push(common::in_play(db, "snorlax", "p0_bench", PlayerId::ZERO));
    state.players[1]
        .board
        .bench
        .push(common::in_play(db, "klefki", "p1_bench", PlayerId::ONE));
    state.players[0]
        .hand
        .add_card(common::in_zone("prime-catcher", "p0_pc", PlayerId::ZERO));

    let offer = engine
        .legal_actions(&state)
        .into_iter()
        .find(|a| a.kind == ActionKind::PlayItem)
        .expect("Prime Catcher should be offered");
    assert_eq!(offer.target_id.as_ref().map(|t| t.0.as_str()), Some("p1_bench"));
    engine.step_inplace(&mut state, &offer).expect("legal item");

    // Opponent switch is immediate.
    assert_eq!(
        state.players[1].board.active.as_ref().map(|a| a.id.0.as_str()),
        Some("p1_bench")
    );

    // Our own switch resolves through the stack.
    let select = Action::select_card(PlayerId::ZERO, CardId("p0_bench".to_string()));
    assert!(engine.legal_actions(&state).contains(&select));
    engine.step_inplace(&mut state, &select).expect("legal selection");
    assert_eq!(
        state.players[0].board.active.as_ref().map(|a| a.id.0.as_str()),
        Some("p0_bench")
    );
}

/// Area Zero Underdepths grants an 8-slot bench only to the player with a
/// Tera Pokemon, and only while it is in play.
#[test]
fn area_zero_expands_bench_under_tera() {
    let engine = common::engine();
    let db = engine.database();
    let mut state = common::battle_state(&engine);
    state.players[0].board.active =
        Some(common::in_play(db, "charizard-ex", "p0_tera", PlayerId::ZERO));
    state.stadium = Some(common::in_zone("area-zero", "stadium0", PlayerId::ZERO));

    let registry = engine.registry();
    assert_eq!(registry.bench_limit_for(&state, db, PlayerId::ZERO), 8);
    assert_eq!(registry.bench_limit_for(&state, db, PlayerId::ONE), 5);

    state.stadium = None;
    assert_eq!(registry.bench_limit_for(&state, db, PlayerId::ZERO), 5);
    assert_eq!(registry.bench_limit_for(&state, db, PlayerId::ONE), 5);
}
