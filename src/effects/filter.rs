//! Card filters for search and selection steps.
//!
//! A filter is a small key/value map carried by a resolution step. Keys are
//! an enumerated vocabulary; an unknown key fails the match rather than
//! being ignored, so a typo narrows a search to nothing instead of widening
//! it to everything.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{CardDatabase, CardDef};
use crate::core::{EnergyType, PlayerState, Subtype, Supertype};

/// Criteria a card definition must satisfy. Empty matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    criteria: FxHashMap<String, String>,
}

impl Filter {
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.criteria.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether `def` satisfies every criterion.
    ///
    /// `player` supplies board context for the keys that need it
    /// (`rare_candy_target` looks at the player's in-play Basics).
    #[must_use]
    pub fn matches(&self, def: &CardDef, db: &CardDatabase, player: Option<&PlayerState>) -> bool {
        self.criteria
            .iter()
            .all(|(key, value)| matches_criterion(key, value, def, db, player))
    }
}

fn matches_criterion(
    key: &str,
    value: &str,
    def: &CardDef,
    db: &CardDatabase,
    player: Option<&PlayerState>,
) -> bool {
    match key {
        "supertype" => match value {
            "Pokemon" => def.supertype == Supertype::Pokemon,
            "Trainer" => def.supertype == Supertype::Trainer,
            "Energy" => def.supertype == Supertype::Energy,
            _ => false,
        },
        "subtype" => Subtype::parse(value).is_some_and(|s| def.has_subtype(s)),
        "pokemon_type" => {
            EnergyType::parse(value).is_some_and(|ty| def.is_pokemon() && def.types.contains(&ty))
        }
        "energy_type" => {
            EnergyType::parse(value).is_some_and(|ty| def.is_energy() && def.energy_type == Some(ty))
        }
        "max_hp" => value
            .parse::<i32>()
            .is_ok_and(|ceiling| def.is_pokemon() && def.hp_or_zero() <= ceiling),
        "name" => def.name == value,
        "evolves_from" => def.evolves_from.as_deref() == Some(value),
        "is_basic" => def.is_basic_pokemon(),
        "is_basic_energy" => def.is_energy() && def.is_basic_energy,
        "rare_candy_target" => is_rare_candy_target(def, db, player),
        "super_rod_target" => def.is_pokemon() || (def.is_energy() && def.is_basic_energy),
        "night_stretcher_target" => def.is_pokemon(),
        // Fail closed.
        _ => false,
    }
}

/// A Stage 2 whose intermediate Stage 1 evolves from a Basic the player has
/// in play.
fn is_rare_candy_target(def: &CardDef, db: &CardDatabase, player: Option<&PlayerState>) -> bool {
    if !def.is_stage_2() {
        return false;
    }
    let Some(stage1_name) = def.evolves_from.as_deref() else {
        return false;
    };
    let Some(player) = player else {
        return false;
    };

    player.board.all_pokemon().any(|poke| {
        db.get(&poke.card_def_id).is_some_and(|in_play| {
            in_play.is_basic_pokemon()
                && db
                    .stage1_names_for_basic(&in_play.name)
                    .contains(&stage1_name)
        })
    })
}

/// Fluent construction for the handler modules.
#[derive(Clone, Debug, Default)]
pub struct FilterBuilder {
    criteria: FxHashMap<String, String>,
}

impl FilterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn supertype(mut self, value: &str) -> Self {
        self.criteria.insert("supertype".into(), value.into());
        self
    }

    #[must_use]
    pub fn subtype(mut self, value: &str) -> Self {
        self.criteria.insert("subtype".into(), value.into());
        self
    }

    #[must_use]
    pub fn pokemon_type(mut self, ty: EnergyType) -> Self {
        self.criteria
            .insert("pokemon_type".into(), ty.as_str().into());
        self
    }

    #[must_use]
    pub fn energy_type(mut self, ty: EnergyType) -> Self {
        self.criteria
            .insert("energy_type".into(), ty.as_str().into());
        self
    }

    #[must_use]
    pub fn max_hp(mut self, ceiling: i32) -> Self {
        self.criteria.insert("max_hp".into(), ceiling.to_string());
        self
    }

    #[must_use]
    pub fn name(mut self, value: &str) -> Self {
        self.criteria.insert("name".into(), value.into());
        self
    }

    #[must_use]
    pub fn evolves_from(mut self, value: &str) -> Self {
        self.criteria.insert("evolves_from".into(), value.into());
        self
    }

    #[must_use]
    pub fn basic_pokemon(mut self) -> Self {
        self.criteria.insert("is_basic".into(), "true".into());
        self
    }

    #[must_use]
    pub fn basic_energy(mut self) -> Self {
        self.criteria.insert("is_basic_energy".into(), "true".into());
        self
    }

    #[must_use]
    pub fn rare_candy_target(mut self) -> Self {
        self.criteria
            .insert("rare_candy_target".into(), "true".into());
        self
    }

    #[must_use]
    pub fn super_rod_target(mut self) -> Self {
        self.criteria
            .insert("super_rod_target".into(), "true".into());
        self
    }

    #[must_use]
    pub fn night_stretcher_target(mut self) -> Self {
        self.criteria
            .insert("night_stretcher_target".into(), "true".into());
        self
    }

    #[must_use]
    pub fn build(self) -> Filter {
        Filter {
            criteria: self.criteria,
        }
    }
}
