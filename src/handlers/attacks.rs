//! Attack handlers with riders beyond the damage pipeline.

use crate::core::ActiveEffect;
use crate::registry::{AttackResult, LogicRegistry};

pub fn register(registry: &mut LogicRegistry) {
    register_iron_leaves_ex(registry);
}

/// Rapid Verdant: full printed damage, but this Pokemon cannot attack
/// during its owner's next turn.
///
/// The lock is an `ActiveEffect` on the attacker. Duration 2 because the
/// end-of-turn sweep for the attacking player runs on the turn the attack
/// was made: one tick is spent immediately, the second covers the next
/// turn.
fn register_iron_leaves_ex(registry: &mut LogicRegistry) {
    registry.register_attack(
        "Iron Leaves ex",
        "Rapid Verdant",
        |state, _db, attacker, _attack_name, _defender| {
            state.add_effect(
                ActiveEffect::new(
                    "cannot_attack_next_turn",
                    attacker.id.clone(),
                    2,
                    attacker.owner_id,
                )
                .with_target_card(attacker.id.clone()),
            );
            AttackResult::default()
        },
    );
}
