//! Card instances - runtime card state.
//!
//! A `CardInstance` is one physical card in one game. It tracks everything
//! mutable: damage, status, attachments, the evolution chain underneath an
//! evolved Pokemon, and per-turn bookkeeping. Attached energy and tools are
//! full instances themselves, so the card-conservation invariant can count
//! every card by walking the state tree.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::database::CardDatabase;
use crate::core::{CardDefId, CardId, EnergyType, PlayerId, StatusCondition, StatusSet};

/// A card instance in a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique instance id, minted at deck materialization.
    pub id: CardId,
    /// Which definition this instance is a copy of.
    pub card_def_id: CardDefId,
    pub owner_id: PlayerId,

    /// Set from the definition when the card enters play.
    pub current_hp: i32,
    /// Each counter is worth 10 HP.
    pub damage_counters: i32,
    pub status: StatusSet,

    /// Energy cards attached to this Pokemon.
    pub attached_energy: Vec<CardInstance>,
    /// Tool cards attached to this Pokemon (at most one in practice).
    pub attached_tools: Vec<CardInstance>,
    /// The cards this Pokemon evolved from, oldest first.
    pub previous_stages: Vec<CardInstance>,

    pub turns_in_play: u32,
    pub evolved_this_turn: bool,
    /// Once-per-turn ability names already used. BTreeSet keeps clones and
    /// equality deterministic.
    pub abilities_used_this_turn: BTreeSet<String>,
    /// Temporary tags left by attacks, cleared at end of turn
    /// (e.g. `cannot_attack_next_turn`).
    pub attack_effects: Vec<String>,
}

impl CardInstance {
    /// Create a fresh instance of a definition.
    #[must_use]
    pub fn new(id: impl Into<CardId>, def_id: impl Into<CardDefId>, owner: PlayerId) -> Self {
        Self {
            id: id.into(),
            card_def_id: def_id.into(),
            owner_id: owner,
            current_hp: 0,
            damage_counters: 0,
            status: StatusSet::empty(),
            attached_energy: Vec::new(),
            attached_tools: Vec::new(),
            previous_stages: Vec::new(),
            turns_in_play: 0,
            evolved_this_turn: false,
            abilities_used_this_turn: BTreeSet::new(),
            attack_effects: Vec::new(),
        }
    }

    // === Status conditions ===

    pub fn add_status(&mut self, status: StatusCondition) {
        self.status.add(status);
    }

    pub fn remove_status(&mut self, status: StatusCondition) {
        self.status.remove(status);
    }

    pub fn clear_all_status(&mut self) {
        self.status.clear();
    }

    #[must_use]
    pub fn has_status(&self, status: StatusCondition) -> bool {
        self.status.contains(status)
    }

    #[must_use]
    pub fn is_asleep_or_paralyzed(&self) -> bool {
        self.status.is_asleep_or_paralyzed()
    }

    // === Damage ===

    /// Knocked out iff counters x 10 reach the definition's HP.
    #[must_use]
    pub fn is_knocked_out(&self, definition_hp: i32) -> bool {
        self.damage_counters * 10 >= definition_hp
    }

    /// Remaining HP given the definition's printed HP.
    #[must_use]
    pub fn remaining_hp(&self, definition_hp: i32) -> i32 {
        (definition_hp - self.damage_counters * 10).max(0)
    }

    /// Heal `amount` HP, clamping at zero counters.
    pub fn heal(&mut self, amount: i32) {
        self.damage_counters = (self.damage_counters - amount / 10).max(0);
    }

    // === Energy accounting ===

    #[must_use]
    pub fn total_attached_energy(&self) -> usize {
        self.attached_energy.len()
    }

    /// The multiset of energy this Pokemon's attachments provide.
    ///
    /// Basic energy contributes one of its own type; special energy
    /// contributes its `provides` list, defaulting to one Colorless when
    /// unspecified. Unknown definitions contribute nothing.
    #[must_use]
    pub fn provided_energy(&self, db: &CardDatabase) -> FxHashMap<EnergyType, u32> {
        let mut provided: FxHashMap<EnergyType, u32> = FxHashMap::default();

        for energy in &self.attached_energy {
            let Some(def) = db.get(&energy.card_def_id) else {
                continue;
            };

            if def.is_basic_energy {
                if let Some(ty) = def.energy_type {
                    *provided.entry(ty).or_insert(0) += 1;
                }
            } else if def.provides.is_empty() {
                *provided.entry(EnergyType::Colorless).or_insert(0) += 1;
            } else {
                for &ty in &def.provides {
                    *provided.entry(ty).or_insert(0) += 1;
                }
            }
        }

        provided
    }

    // === Turn bookkeeping ===

    /// Reset per-turn flags at the start of the owner's turn.
    pub fn reset_turn_flags(&mut self) {
        self.evolved_this_turn = false;
        self.abilities_used_this_turn.clear();
    }

    /// Count this card plus every card nested under it.
    #[must_use]
    pub fn card_count(&self) -> usize {
        1 + self.attached_energy.len()
            + self.attached_tools.len()
            + self.previous_stages.iter().map(CardInstance::card_count).sum::<usize>()
    }

    /// Visit this card's id and the ids of every nested card.
    pub fn visit_ids<'a>(&'a self, visit: &mut impl FnMut(&'a CardId)) {
        visit(&self.id);
        for energy in &self.attached_energy {
            visit(&energy.id);
        }
        for tool in &self.attached_tools {
            visit(&tool.id);
        }
        for stage in &self.previous_stages {
            stage.visit_ids(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::definition::CardDef;

    fn instance(id: &str) -> CardInstance {
        CardInstance::new(id, "sv3-26", PlayerId::ZERO)
    }

    #[test]
    fn test_knockout_threshold() {
        let mut poke = instance("card_1");
        poke.damage_counters = 5;
        assert!(!poke.is_knocked_out(60));
        poke.damage_counters = 6;
        assert!(poke.is_knocked_out(60));
        // Overkill still counts.
        poke.damage_counters = 9;
        assert!(poke.is_knocked_out(60));
    }

    #[test]
    fn test_heal_clamps_to_zero() {
        let mut poke = instance("card_1");
        poke.damage_counters = 3;
        poke.heal(20);
        assert_eq!(poke.damage_counters, 1);
        poke.heal(120);
        assert_eq!(poke.damage_counters, 0);
        poke.heal(120);
        assert_eq!(poke.damage_counters, 0);
    }

    #[test]
    fn test_provided_energy_mixed() {
        let mut db = CardDatabase::new();
        db.insert(CardDef::basic_energy("sve-2", "Fire Energy", EnergyType::Fire));
        // Special energy with an explicit provides list.
        let mut twin = CardDef::basic_energy("sv5-191", "Double Turbo Energy", EnergyType::Colorless);
        twin.is_basic_energy = false;
        twin.provides =
            smallvec::SmallVec::from_slice(&[EnergyType::Colorless, EnergyType::Colorless]);
        db.insert(twin);
        // Special energy with no provides list defaults to one Colorless.
        let mut mystery = CardDef::basic_energy("x-1", "Mystery Energy", EnergyType::Colorless);
        mystery.is_basic_energy = false;
        mystery.provides = smallvec::SmallVec::new();
        db.insert(mystery);

        let mut poke = instance("card_1");
        poke.attached_energy
            .push(CardInstance::new("e1", "sve-2", PlayerId::ZERO));
        poke.attached_energy
            .push(CardInstance::new("e2", "sv5-191", PlayerId::ZERO));
        poke.attached_energy
            .push(CardInstance::new("e3", "x-1", PlayerId::ZERO));

        let provided = poke.provided_energy(&db);
        assert_eq!(provided.get(&EnergyType::Fire), Some(&1));
        assert_eq!(provided.get(&EnergyType::Colorless), Some(&3));
    }

    #[test]
    fn test_card_count_includes_nested() {
        let mut evolved = instance("card_2");
        evolved.attached_energy
            .push(CardInstance::new("e1", "sve-2", PlayerId::ZERO));
        let mut base = instance("card_1");
        base.attached_tools
            .push(CardInstance::new("t1", "sv1-1", PlayerId::ZERO));
        evolved.previous_stages.push(base);

        // evolved + energy + base + tool
        assert_eq!(evolved.card_count(), 4);

        let mut seen = Vec::new();
        evolved.visit_ids(&mut |id| seen.push(id.clone()));
        assert_eq!(seen.len(), 4);
    }
}
