//! The damage pipeline and energy cost matching.

use rustc_hash::FxHashMap;

use crate::cards::CardDef;
use crate::core::{EnergyType, GameState};
use crate::registry::LogicRegistry;

/// Whether `provided` covers `cost`.
///
/// Specific (non-Colorless) slots must be paid from the exact matching
/// bucket; Colorless slots are paid from whatever remains.
#[must_use]
pub fn can_pay_cost(provided: &FxHashMap<EnergyType, u32>, cost: &[EnergyType]) -> bool {
    let mut specific_needs: FxHashMap<EnergyType, u32> = FxHashMap::default();
    let mut colorless_needed = 0u32;
    for &slot in cost {
        if slot == EnergyType::Colorless {
            colorless_needed += 1;
        } else {
            *specific_needs.entry(slot).or_insert(0) += 1;
        }
    }

    let mut spent = 0u32;
    for (&ty, &need) in &specific_needs {
        let have = provided.get(&ty).copied().unwrap_or(0);
        if have < need {
            return false;
        }
        spent += need;
    }

    let total: u32 = provided.values().sum();
    total - spent >= colorless_needed
}

/// Run damage through the full pipeline and return the final counter count.
///
/// Order: base, attacker-side `damage_dealt` modifiers, weakness,
/// resistance, defender-side `damage_taken` modifiers, board-wide
/// `global_damage` modifiers, clamp.
#[must_use]
pub fn compute_damage(
    registry: &LogicRegistry,
    state: &GameState,
    db: &crate::cards::CardDatabase,
    attacker_def: &CardDef,
    defender_def: &CardDef,
    base_damage: i32,
) -> i32 {
    let mut damage = base_damage;

    damage = registry.apply_modifiers(state, &attacker_def.name, "damage_dealt", damage);

    if let Some(weakness) = defender_def.weakness {
        if attacker_def.types.contains(&weakness.energy_type) {
            damage *= weakness.multiplier;
        }
    }
    if let Some(resistance) = defender_def.resistance {
        if attacker_def.types.contains(&resistance.energy_type) {
            damage += resistance.value;
        }
    }

    damage = registry.apply_modifiers(state, &defender_def.name, "damage_taken", damage);
    damage = registry.scan_global_modifiers(state, db, "global_damage", damage);

    damage.max(0)
}

/// Retreat cost after per-card and board-wide modifiers, clamped at zero.
#[must_use]
pub fn modified_retreat_cost(
    registry: &LogicRegistry,
    state: &GameState,
    db: &crate::cards::CardDatabase,
    active_def: &CardDef,
) -> i32 {
    let mut cost = i32::from(active_def.retreat_cost);
    cost = registry.apply_modifiers(state, &active_def.name, "retreat_cost", cost);
    cost = registry.scan_global_modifiers(state, db, "global_retreat_cost", cost);
    cost.max(0)
}
