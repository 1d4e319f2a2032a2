//! Item handlers.

use crate::cards::CardDatabase;
use crate::core::{Action, CardId, GameState, ZoneKind};
use crate::effects::{builders, EffectResult, FilterBuilder};
use crate::registry::{GeneratorResult, LogicRegistry, TrainerContext};
use crate::rules::engine::evolve_in_place;
use crate::stack::CompletionCallback;

pub fn register(registry: &mut LogicRegistry) {
    register_nest_ball(registry);
    register_buddy_buddy_poffin(registry);
    register_ultra_ball(registry);
    register_super_rod(registry);
    register_night_stretcher(registry);
    register_rare_candy(registry);
    register_prime_catcher(registry);
}

/// Search your deck for a Basic Pokemon and put it onto your Bench.
/// Then, shuffle your deck.
fn register_nest_ball(registry: &mut LogicRegistry) {
    registry.register_generator("Nest Ball", |state, _db, _card| {
        let player = state.player(state.active_player);
        if player.deck.is_empty() {
            return GeneratorResult::invalid("deck is empty");
        }
        if !player.board.can_add_to_bench() {
            return GeneratorResult::invalid("bench is full");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Nest Ball", |ctx: TrainerContext<'_>| {
        let filter = FilterBuilder::new().basic_pokemon().build();
        builders::search_deck_to_bench(ctx.state, &ctx.card.id, "Nest Ball", ctx.player, filter, 1)
    });
}

/// Search your deck for up to 2 Basic Pokemon with 70 HP or less and put
/// them onto your Bench. Then, shuffle your deck.
fn register_buddy_buddy_poffin(registry: &mut LogicRegistry) {
    registry.register_generator("Buddy-Buddy Poffin", |state, _db, _card| {
        let player = state.player(state.active_player);
        if player.deck.is_empty() {
            return GeneratorResult::invalid("deck is empty");
        }
        if !player.board.can_add_to_bench() {
            return GeneratorResult::invalid("bench is full");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Buddy-Buddy Poffin", |ctx: TrainerContext<'_>| {
        let filter = FilterBuilder::new().basic_pokemon().max_hp(70).build();
        builders::search_deck_to_bench(
            ctx.state,
            &ctx.card.id,
            "Buddy-Buddy Poffin",
            ctx.player,
            filter,
            2,
        )
    });
}

/// Discard 2 cards from your hand, then search your deck for a Pokemon and
/// put it into your hand. Shuffle afterwards.
fn register_ultra_ball(registry: &mut LogicRegistry) {
    registry.register_generator("Ultra Ball", |state, _db, card| {
        let others = state
            .player(state.active_player)
            .hand
            .cards
            .iter()
            .filter(|c| c.id != card.id)
            .count();
        if others < 2 {
            return GeneratorResult::invalid("not enough cards to discard");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Ultra Ball", |ctx: TrainerContext<'_>| {
        let source = ctx.card.id.clone();
        builders::discard_then(
            ctx.state,
            ctx.db,
            &ctx.card.id,
            "Ultra Ball",
            ctx.player,
            2,
            crate::effects::Filter::any(),
            move |state: &mut GameState, _db: &CardDatabase, player| {
                let filter = FilterBuilder::new().supertype("Pokemon").build();
                // Fail-to-find is allowed; an empty deck just ends the play.
                let _ = builders::search_deck(
                    state,
                    &source,
                    "Ultra Ball",
                    player,
                    filter,
                    1,
                    0,
                    ZoneKind::Hand,
                    true,
                    CompletionCallback::none(),
                );
            },
        )
    });
}

/// Shuffle up to 3 Pokemon or Basic Energy cards from your discard pile
/// into your deck.
fn register_super_rod(registry: &mut LogicRegistry) {
    registry.register_generator("Super Rod", |state, db, _card| {
        let player = state.player(state.active_player);
        let filter = FilterBuilder::new().super_rod_target().build();
        let matching = player
            .discard
            .cards
            .iter()
            .filter(|c| {
                db.get(&c.card_def_id)
                    .is_some_and(|def| filter.matches(def, db, Some(player)))
            })
            .count();
        if matching == 0 {
            return GeneratorResult::invalid("nothing to recover");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Super Rod", |ctx: TrainerContext<'_>| {
        let filter = FilterBuilder::new().super_rod_target().build();
        builders::shuffle_discard_to_deck(
            ctx.state,
            ctx.db,
            &ctx.card.id,
            "Super Rod",
            ctx.player,
            filter,
            3,
            1,
        )
    });
}

/// Put a Pokemon or a Basic Energy card from your discard pile into your
/// hand.
fn register_night_stretcher(registry: &mut LogicRegistry) {
    registry.register_generator("Night Stretcher", |state, db, _card| {
        let player = state.player(state.active_player);
        let filter = FilterBuilder::new().night_stretcher_target().build();
        let matching = player
            .discard
            .cards
            .iter()
            .filter(|c| {
                db.get(&c.card_def_id)
                    .is_some_and(|def| filter.matches(def, db, Some(player)))
            })
            .count();
        if matching == 0 {
            return GeneratorResult::invalid("nothing to recover");
        }
        GeneratorResult::valid()
    });

    registry.register_trainer("Night Stretcher", |ctx: TrainerContext<'_>| {
        let filter = FilterBuilder::new().night_stretcher_target().build();
        builders::recover_from_discard(
            ctx.state,
            ctx.db,
            &ctx.card.id,
            "Night Stretcher",
            ctx.player,
            filter,
            1,
            1,
        )
    });
}

/// Evolve a Basic Pokemon straight to a Stage 2 from your hand. Not on the
/// first turn, and not on a Basic put into play this turn.
///
/// One action is generated per valid (Basic in play, Stage 2 in hand)
/// pair; the pair rides on the action as `target_id` plus the `stage2`
/// parameter. Action equality ignores parameters, so each pair also gets
/// a distinct `choice_index`: two pairs onto the same Basic stay separate
/// choices for a search.
fn register_rare_candy(registry: &mut LogicRegistry) {
    registry.register_generator("Rare Candy", |state, db, card| {
        if state.turn_count <= 1 {
            return GeneratorResult::invalid("cannot play on the first turn");
        }
        let player_id = state.active_player;
        let player = state.player(player_id);

        let mut actions = Vec::new();
        for basic in player.board.all_pokemon() {
            if basic.turns_in_play == 0 {
                continue;
            }
            let Some(basic_def) = db.get(&basic.card_def_id) else {
                continue;
            };
            if !basic_def.is_basic_pokemon() {
                continue;
            }
            let stage1_names = db.stage1_names_for_basic(&basic_def.name);
            for stage2 in &player.hand.cards {
                let Some(stage2_def) = db.get(&stage2.card_def_id) else {
                    continue;
                };
                if !stage2_def.is_stage_2() {
                    continue;
                }
                let bridges = stage2_def
                    .evolves_from
                    .as_deref()
                    .is_some_and(|from| stage1_names.contains(&from));
                if !bridges {
                    continue;
                }
                let action = Action::play_item(player_id, card.id.clone())
                    .with_target(basic.id.clone())
                    .with_param("stage2", stage2.id.0.clone())
                    .with_choice(actions.len())
                    .with_label(format!(
                        "Rare Candy: {} to {}",
                        basic_def.name, stage2_def.name
                    ));
                actions.push(action);
            }
        }
        if actions.is_empty() {
            return GeneratorResult::invalid("no valid evolution pair");
        }
        GeneratorResult::actions(actions)
    });

    registry.register_trainer("Rare Candy", |ctx: TrainerContext<'_>| {
        let Some(target_id) = ctx.action.target_id.clone() else {
            return EffectResult::failed("no Basic target on the action");
        };
        let Some(stage2_param) = ctx.action.param("stage2") else {
            return EffectResult::failed("no Stage 2 named on the action");
        };
        let stage2_id = CardId(stage2_param.to_string());

        let Some(stage2) = ctx.state.player_mut(ctx.player).hand.take_card(&stage2_id) else {
            return EffectResult::failed("Stage 2 is not in hand");
        };
        let Some(stage2_def) = ctx.db.get(&stage2.card_def_id).cloned() else {
            ctx.state.player_mut(ctx.player).hand.add_card(stage2);
            return EffectResult::failed("unknown Stage 2 definition");
        };

        if evolve_in_place(ctx.state, ctx.player, &target_id, stage2, &stage2_def) {
            EffectResult::applied()
        } else {
            EffectResult::failed("target is not in play")
        }
    });
}

/// ACE SPEC. Switch in one of your opponent's Benched Pokemon to the
/// Active Spot, then switch your own Active with a Benched Pokemon.
fn register_prime_catcher(registry: &mut LogicRegistry) {
    registry.register_generator("Prime Catcher", |state, _db, card| {
        let player_id = state.active_player;
        if state.player(player_id).board.bench_count() == 0 {
            return GeneratorResult::invalid("no benched Pokemon to switch in");
        }
        let actions: Vec<Action> = state
            .opponent(player_id)
            .board
            .bench
            .iter()
            .map(|poke| {
                Action::play_item(player_id, card.id.clone())
                    .with_target(poke.id.clone())
                    .with_label("Prime Catcher")
            })
            .collect();
        if actions.is_empty() {
            return GeneratorResult::invalid("opponent has no benched Pokemon");
        }
        GeneratorResult::actions(actions)
    });

    registry.register_trainer("Prime Catcher", |ctx: TrainerContext<'_>| {
        let Some(target_id) = ctx.action.target_id.clone() else {
            return EffectResult::failed("no opponent target on the action");
        };
        let opponent = ctx.player.opponent();
        if !ctx
            .state
            .player_mut(opponent)
            .board
            .switch_active(&target_id)
        {
            return EffectResult::failed("target is not on the opponent's bench");
        }
        builders::switch_active(ctx.state, &ctx.card.id, "Prime Catcher", ctx.player, false)
    });
}
