//! Ability handlers.

use std::sync::Arc;

use crate::cards::CardDatabase;
use crate::registry::{LogicRegistry, PassiveHandler};

pub fn register(registry: &mut LogicRegistry, db: &Arc<CardDatabase>) {
    register_klefki(registry, db);
}

/// Mischievous Lock: as long as Klefki is in the Active Spot, Basic
/// Pokemon other than Klefki have no Abilities.
///
/// Scanned from the active slots by the ability-block check; the effect
/// answers per queried (target, ability) pair.
fn register_klefki(registry: &mut LogicRegistry, db: &Arc<CardDatabase>) {
    let db = Arc::clone(db);
    registry.register_passive(
        "Klefki",
        PassiveHandler {
            condition: Arc::new(|state, source| {
                state.players.iter().any(|player| {
                    player
                        .board
                        .active
                        .as_ref()
                        .is_some_and(|active| active.id == source.id)
                })
            }),
            effect: Arc::new(move |_state, source, target, _ability_name| {
                if target.id == source.id {
                    return false;
                }
                db.get(&target.card_def_id)
                    .is_some_and(|def| def.is_basic_pokemon())
            }),
        },
    );
}
