//! Reusable effect primitives.
//!
//! Card handlers compose these instead of pushing raw steps. Each builder
//! validates the effect against the current state, pushes at most a few
//! resolution steps, and reports whether the effect applied immediately,
//! needs resolution, or failed. A failed builder leaves the state as it
//! found it, letting the caller reject the triggering action outright.

use tracing::debug;

use crate::cards::CardDatabase;
use crate::core::{CardId, GameState, PlayerId, SelectionPurpose, ZoneKind};
use crate::stack::{CompletionCallback, ResolutionStep, StepHeader};

use super::filter::Filter;

/// Outcome of an effect builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectResult {
    pub success: bool,
    /// True when steps were pushed and the effect finishes via the stack.
    pub requires_resolution: bool,
    pub message: String,
}

impl EffectResult {
    #[must_use]
    pub fn applied() -> Self {
        Self {
            success: true,
            requires_resolution: false,
            message: String::new(),
        }
    }

    #[must_use]
    pub fn pending() -> Self {
        Self {
            success: true,
            requires_resolution: true,
            message: String::new(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            requires_resolution: false,
            message: message.into(),
        }
    }
}

/// Push a deck-search step. `min_count = 0` lets the player fail to find.
///
/// Marks the player's deck as searched for the knowledge layer. The step's
/// default completion moves the picks to `destination` and shuffles when
/// `shuffle_after` is set; pass `on_complete` to override.
#[allow(clippy::too_many_arguments)]
pub fn search_deck(
    state: &mut GameState,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    filter: Filter,
    count: usize,
    min_count: usize,
    destination: ZoneKind,
    shuffle_after: bool,
    on_complete: CompletionCallback,
) -> EffectResult {
    if state.player(player).deck.is_empty() {
        return EffectResult::failed("deck is empty");
    }

    state.player_mut(player).has_searched_deck = true;

    let header = StepHeader::new(
        source_id.clone(),
        source_name,
        player,
        SelectionPurpose::SearchTarget,
    )
    .with_callback(on_complete);

    state.push_step(ResolutionStep::search_deck(
        header,
        count,
        min_count,
        destination,
        filter,
        shuffle_after,
    ));
    EffectResult::pending()
}

/// Deck search whose picks go straight to the bench.
pub fn search_deck_to_bench(
    state: &mut GameState,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    filter: Filter,
    count: usize,
) -> EffectResult {
    let space = state.player(player).board.bench_limit
        - state.player(player).board.bench_count();
    if space == 0 {
        return EffectResult::failed("bench is full");
    }

    search_deck(
        state,
        source_id,
        source_name,
        player,
        filter,
        count.min(space),
        0,
        ZoneKind::Bench,
        true,
        CompletionCallback::none(),
    )
}

/// Discard `discard_count` hand cards matching `filter`, then run
/// `then_effect`. The source card is excluded from the discard choices.
///
/// Fails without touching the state when the hand cannot supply the
/// discards, so the caller can reject the play.
pub fn discard_then(
    state: &mut GameState,
    db: &CardDatabase,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    discard_count: usize,
    filter: Filter,
    then_effect: impl Fn(&mut GameState, &CardDatabase, PlayerId) + Send + Sync + 'static,
) -> EffectResult {
    let candidates = state
        .player(player)
        .hand
        .cards
        .iter()
        .filter(|card| card.id != *source_id)
        .filter(|card| {
            db.get(&card.card_def_id)
                .is_some_and(|def| filter.matches(def, db, Some(state.player(player))))
        })
        .count();
    if candidates < discard_count {
        return EffectResult::failed("not enough cards to discard");
    }

    let callback = CompletionCallback::new(move |state, db, selected, player| {
        for id in selected {
            if let Some(card) = state.player_mut(player).hand.take_card(id) {
                state.player_mut(player).discard.add_card(card);
            } else {
                debug!(card = %id, "discard target left hand before completion");
            }
        }
        then_effect(state, db, player);
    });

    let header = StepHeader::new(
        source_id.clone(),
        source_name,
        player,
        SelectionPurpose::DiscardCost,
    )
    .with_callback(callback);

    state.push_step(ResolutionStep::select_from_zone(
        header,
        ZoneKind::Hand,
        discard_count,
        discard_count,
        Some(discard_count),
        filter,
        vec![source_id.clone()],
    ));
    EffectResult::pending()
}

/// Draw up to `count` cards. Drawing from an empty deck draws nothing; the
/// deck-out loss is checked by the engine, not here.
pub fn draw_cards(state: &mut GameState, player: PlayerId, count: usize) -> EffectResult {
    let player_state = state.player_mut(player);
    for _ in 0..count {
        match player_state.deck.draw_top() {
            Some(card) => player_state.hand.add_card(card),
            None => break,
        }
    }
    EffectResult::applied()
}

/// Discard the whole hand, then draw `draw_count`.
pub fn discard_hand_draw(state: &mut GameState, player: PlayerId, draw_count: usize) -> EffectResult {
    let player_state = state.player_mut(player);
    let hand = std::mem::take(&mut player_state.hand.cards);
    for card in hand {
        player_state.discard.add_card(card);
    }
    draw_cards(state, player, draw_count)
}

/// Pick up to `count` discard-pile cards and shuffle them into the deck.
///
/// The discard pile is public, so "fail to find" does not apply:
/// `min_count` must be at least 1, and the builder fails when the pile
/// cannot supply it.
pub fn shuffle_discard_to_deck(
    state: &mut GameState,
    db: &CardDatabase,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    filter: Filter,
    count: usize,
    min_count: usize,
) -> EffectResult {
    recover_from_discard_impl(
        state,
        db,
        source_id,
        source_name,
        player,
        filter,
        count,
        min_count,
        SelectionPurpose::RecoverToDeck,
    )
}

/// Pick up to `count` discard-pile cards into the hand. Same public-zone
/// rule as [`shuffle_discard_to_deck`].
pub fn recover_from_discard(
    state: &mut GameState,
    db: &CardDatabase,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    filter: Filter,
    count: usize,
    min_count: usize,
) -> EffectResult {
    recover_from_discard_impl(
        state,
        db,
        source_id,
        source_name,
        player,
        filter,
        count,
        min_count,
        SelectionPurpose::RecoverToHand,
    )
}

#[allow(clippy::too_many_arguments)]
fn recover_from_discard_impl(
    state: &mut GameState,
    db: &CardDatabase,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    filter: Filter,
    count: usize,
    min_count: usize,
    purpose: SelectionPurpose,
) -> EffectResult {
    if min_count == 0 {
        return EffectResult::failed("recovery from a public zone requires min_count >= 1");
    }

    let available = state
        .player(player)
        .discard
        .cards
        .iter()
        .filter(|card| {
            db.get(&card.card_def_id)
                .is_some_and(|def| filter.matches(def, db, Some(state.player(player))))
        })
        .count();
    if available < min_count {
        return EffectResult::failed("not enough matching cards in discard");
    }

    let header = StepHeader::new(source_id.clone(), source_name, player, purpose);
    state.push_step(ResolutionStep::select_from_zone(
        header,
        ZoneKind::Discard,
        min_count,
        count,
        None,
        filter,
        Vec::new(),
    ));
    EffectResult::pending()
}

/// Push bench-selection steps that switch the chosen Pokemon into the
/// active slot. With `opponent_also`, the opponent's step is pushed first
/// so the acting player chooses first and the opponent resolves last.
pub fn switch_active(
    state: &mut GameState,
    source_id: &CardId,
    source_name: &str,
    player: PlayerId,
    opponent_also: bool,
) -> EffectResult {
    if state.player(player).board.bench_count() == 0 {
        return EffectResult::failed("no benched Pokemon to switch in");
    }

    if opponent_also && state.opponent(player).board.bench_count() > 0 {
        push_switch_step(state, source_id, source_name, player.opponent());
    }
    push_switch_step(state, source_id, source_name, player);
    EffectResult::pending()
}

fn push_switch_step(state: &mut GameState, source_id: &CardId, source_name: &str, player: PlayerId) {
    let header = StepHeader::new(
        source_id.clone(),
        source_name,
        player,
        SelectionPurpose::SwitchTarget,
    );
    state.push_step(ResolutionStep::select_from_zone(
        header,
        ZoneKind::Bench,
        1,
        1,
        Some(1),
        Filter::any(),
        Vec::new(),
    ));
}

/// Heal `amount` HP from an in-play Pokemon. Removes `amount / 10`
/// counters, clamped at zero.
pub fn heal_damage(
    state: &mut GameState,
    player: PlayerId,
    target: &CardId,
    amount: i32,
) -> EffectResult {
    match state.player_mut(player).find_pokemon_mut(target) {
        Some(poke) => {
            poke.heal(amount);
            EffectResult::applied()
        }
        None => EffectResult::failed("heal target is not in play"),
    }
}

/// Place damage counters on any in-play Pokemon (either side).
pub fn add_damage_counters(state: &mut GameState, target: &CardId, counters: i32) -> EffectResult {
    for player in PlayerId::both().collect::<Vec<_>>() {
        if let Some(poke) = state.player_mut(player).find_pokemon_mut(target) {
            poke.damage_counters += counters.max(0);
            return EffectResult::applied();
        }
    }
    EffectResult::failed("counter target is not in play")
}
