//! Supporter handlers.

use crate::core::{Action, ActiveEffect, PlayerId, ZoneKind};
use crate::effects::{builders, EffectResult, FilterBuilder};
use crate::registry::{GeneratorResult, LogicRegistry, TrainerContext};
use crate::stack::CompletionCallback;

pub fn register(registry: &mut LogicRegistry) {
    register_iono(registry);
    register_boss_orders(registry);
    register_briar(registry);
    register_dawn(registry);
}

/// Each player shuffles their hand to the bottom of their deck, then draws
/// a card for each of their remaining prizes. Immediate, no stack.
fn register_iono(registry: &mut LogicRegistry) {
    registry.register_generator("Iono", |_state, _db, _card| GeneratorResult::valid());

    registry.register_trainer("Iono", |ctx: TrainerContext<'_>| {
        let state = ctx.state;
        let any_moved = state.players.iter().any(|p| !p.hand.is_empty());

        for player in [PlayerId::ZERO, PlayerId::ONE] {
            let idx = player.index();
            let mut hand = std::mem::take(&mut state.players[idx].hand.cards);
            state.rng.shuffle(&mut hand);
            for card in hand {
                state.players[idx].deck.add_to_bottom(card);
            }
        }

        if any_moved {
            for player in [PlayerId::ZERO, PlayerId::ONE] {
                let idx = player.index();
                let count = state.players[idx].prizes.count();
                for _ in 0..count {
                    if let Some(card) = state.players[idx].deck.draw_top() {
                        state.players[idx].hand.add_card(card);
                    }
                }
            }
        }
        EffectResult::applied()
    });
}

/// Switch in one of your opponent's Benched Pokemon to the Active Spot.
/// One action per benched target.
fn register_boss_orders(registry: &mut LogicRegistry) {
    registry.register_generator("Boss's Orders", |state, _db, card| {
        let player_id = state.active_player;
        let actions: Vec<Action> = state
            .opponent(player_id)
            .board
            .bench
            .iter()
            .map(|poke| {
                Action::play_supporter(player_id, card.id.clone())
                    .with_target(poke.id.clone())
                    .with_label("Boss's Orders")
            })
            .collect();
        if actions.is_empty() {
            return GeneratorResult::invalid("opponent has no benched Pokemon");
        }
        GeneratorResult::actions(actions)
    });

    registry.register_trainer("Boss's Orders", |ctx: TrainerContext<'_>| {
        let Some(target_id) = ctx.action.target_id.clone() else {
            return EffectResult::failed("no target on the action");
        };
        let opponent = ctx.player.opponent();
        if ctx
            .state
            .player_mut(opponent)
            .board
            .switch_active(&target_id)
        {
            EffectResult::applied()
        } else {
            EffectResult::failed("target is not on the opponent's bench")
        }
    });
}

/// Playable only while the opponent has exactly 2 prizes remaining. For
/// the rest of this turn, a knockout of the opposing active by one of
/// your Tera Pokemon's attacks pays 1 extra prize.
///
/// The payout itself lives in the engine's attack path, keyed on the
/// `extra_prizes` / `requires_tera` effect parameters.
fn register_briar(registry: &mut LogicRegistry) {
    registry.register_generator("Briar", |state, _db, _card| {
        if state.opponent(state.active_player).prizes.count() != 2 {
            return GeneratorResult::invalid("opponent must have exactly 2 prizes remaining");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Briar", |ctx: TrainerContext<'_>| {
        if ctx.state.opponent(ctx.player).prizes.count() != 2 {
            return EffectResult::failed("opponent must have exactly 2 prizes remaining");
        }
        let effect = ActiveEffect::new("briar_extra_prize", ctx.card.id.clone(), 1, ctx.player)
            .with_target_player(ctx.player)
            .with_param("extra_prizes", "1")
            .with_param("requires_tera", "true");
        ctx.state.add_effect(effect);
        EffectResult::applied()
    });
}

/// Search your deck for a Basic, a Stage 1 and a Stage 2 Pokemon and put
/// them into your hand. Then, shuffle your deck.
///
/// Three steps in stack order: the Stage 2 search is pushed first so it
/// resolves last and owns the final shuffle. Each search may fail to find.
fn register_dawn(registry: &mut LogicRegistry) {
    registry.register_generator("Dawn", |state, _db, _card| {
        if state.player(state.active_player).deck.is_empty() {
            return GeneratorResult::invalid("deck is empty");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Dawn", |ctx: TrainerContext<'_>| {
        let stages = [("Stage 2", true), ("Stage 1", false), ("Basic", false)];
        for (stage, shuffle_after) in stages {
            let filter = FilterBuilder::new()
                .supertype("Pokemon")
                .subtype(stage)
                .build();
            let result = builders::search_deck(
                ctx.state,
                &ctx.card.id,
                "Dawn",
                ctx.player,
                filter,
                1,
                0,
                ZoneKind::Hand,
                shuffle_after,
                CompletionCallback::none(),
            );
            if !result.success {
                return result;
            }
        }
        EffectResult::pending()
    });
}
