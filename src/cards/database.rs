//! Card database: immutable definition lookup.
//!
//! Built once before any game starts (the JSON loader lives outside this
//! crate) and then treated as read-only. The engine consumes only the read
//! API: [`get`](CardDatabase::get), [`has`](CardDatabase::has),
//! [`all_ids`](CardDatabase::all_ids).
//!
//! The database also categorizes abilities by scanning their text for
//! category markers. This is a heuristic default; handlers override it by
//! constructing definitions with an explicit [`AbilityCategory`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{AbilityCategory, CardDef};
use crate::core::CardDefId;

/// Registry of card definitions keyed by definition id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardDatabase {
    cards: FxHashMap<CardDefId, CardDef>,
}

impl CardDatabase {
    /// Create a new empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition. Later inserts with the same id replace earlier
    /// ones; loading is a pre-game concern.
    pub fn insert(&mut self, def: CardDef) {
        self.cards.insert(def.card_def_id.clone(), def);
    }

    /// Get a definition by id.
    #[must_use]
    pub fn get(&self, id: &CardDefId) -> Option<&CardDef> {
        self.cards.get(id)
    }

    /// Check whether a definition exists.
    #[must_use]
    pub fn has(&self, id: &CardDefId) -> bool {
        self.cards.contains_key(id)
    }

    /// Iterate over all known definition ids.
    pub fn all_ids(&self) -> impl Iterator<Item = &CardDefId> {
        self.cards.keys()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDef> {
        self.cards.values()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All Stage 1 names that evolve from the given Basic name.
    ///
    /// Used by Rare Candy style effects to bridge Basic -> Stage 2.
    #[must_use]
    pub fn stage1_names_for_basic(&self, basic_name: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .cards
            .values()
            .filter(|def| def.is_stage_1() && def.evolves_from.as_deref() == Some(basic_name))
            .map(|def| def.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Guess an ability's category from its text.
///
/// Heuristic markers, checked in order:
/// - "has no abilities" / "can't use" -> passive lock
/// - "can't be" / "prevent" / "protected" -> guard
/// - "when this pokemon" / "when you play" -> hook with trigger
/// - retreat-cost / HP / damage mentions -> modifier
/// - once-per-turn / "you may" -> activatable
#[must_use]
pub fn categorize_ability(text: &str) -> AbilityCategory {
    let lower = text.to_lowercase();

    if lower.contains("has no abilities") || lower.contains("can't use") {
        let kind = if lower.contains("item") {
            "item_lock"
        } else {
            "ability_lock"
        };
        return AbilityCategory::Passive {
            kind: kind.to_string(),
        };
    }

    if lower.contains("can't be") || lower.contains("prevent") || lower.contains("protected") {
        return AbilityCategory::Guard;
    }

    if lower.contains("when this pokemon") || lower.contains("when you play") {
        let trigger = if lower.contains("evolve") {
            "on_evolve"
        } else if lower.contains("knocked out") {
            "on_knockout"
        } else if lower.contains("attach") {
            "on_attach_energy"
        } else {
            "on_play"
        };
        return AbilityCategory::Hook {
            trigger: trigger.to_string(),
        };
    }

    if lower.contains("retreat cost") {
        return AbilityCategory::Modifier {
            context: "retreat_cost".to_string(),
        };
    }
    if lower.contains("damage") && (lower.contains("more") || lower.contains("less")) {
        let context = if lower.contains("takes") {
            "damage_taken"
        } else {
            "damage_dealt"
        };
        return AbilityCategory::Modifier {
            context: context.to_string(),
        };
    }
    if lower.contains(" hp") && (lower.contains("more") || lower.contains("gets")) {
        return AbilityCategory::Modifier {
            context: "hp".to_string(),
        };
    }

    // Default: player-triggered.
    AbilityCategory::Activatable
}
