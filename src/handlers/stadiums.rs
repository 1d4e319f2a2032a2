//! Stadium handlers.

use std::sync::Arc;

use crate::registry::{LogicRegistry, StadiumHandler};

const EXPANDED_BENCH_LIMIT: usize = 8;

pub fn register(registry: &mut LogicRegistry) {
    register_area_zero_underdepths(registry);
}

/// If a player has a Tera Pokemon in play, that player's Bench holds up to
/// 8 Pokemon. Purely continuous; the engine re-derives bench limits after
/// every board change, so leaving play shrinks the limit without
/// discarding anyone.
fn register_area_zero_underdepths(registry: &mut LogicRegistry) {
    registry.register_stadium(
        "Area Zero Underdepths",
        StadiumHandler {
            on_enter: None,
            on_leave: None,
            bench_size: Some(Arc::new(|_state, _db, _player| EXPANDED_BENCH_LIMIT)),
            condition: Some(Arc::new(|state, db, player| {
                state
                    .player(player)
                    .board
                    .all_pokemon()
                    .any(|poke| db.get(&poke.card_def_id).is_some_and(|def| def.is_tera()))
            })),
        },
    );
}
