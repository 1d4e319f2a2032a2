//! Card definitions - static card data.
//!
//! A [`CardDef`] holds the immutable properties of a printed card: name,
//! supertype, HP, attacks, abilities, energy fields. Instance-specific data
//! (damage, attachments, zone) lives in [`CardInstance`](super::CardInstance).
//!
//! ## Functional id
//!
//! Two printings of the same card share a name but may differ in stats or
//! text (a 70 HP Charmander and an 80 HP Charmander with an ability). The
//! *functional id* hashes exactly the fields that matter to gameplay, so
//! action generation can deduplicate truly-equivalent cards and nothing
//! else.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

use crate::core::{CardDefId, EnergyType, Subtype, Supertype};

/// An attack printed on a Pokemon card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDef {
    pub name: String,
    /// Ordered energy cost. Colorless slots accept any energy.
    pub cost: SmallVec<[EnergyType; 4]>,
    /// Total cost length, kept explicit to match card data.
    pub converted_cost: u8,
    pub base_damage: i32,
    /// `""`, `"+"`, `"x"` or `"-"`.
    pub damage_modifier: String,
    pub text: String,
    /// Key into the logic registry for this attack's handler.
    pub handler_key: String,
}

impl AttackDef {
    #[must_use]
    pub fn new(name: impl Into<String>, cost: &[EnergyType], base_damage: i32) -> Self {
        let name = name.into();
        Self {
            handler_key: name.clone(),
            name,
            cost: SmallVec::from_slice(cost),
            converted_cost: cost.len() as u8,
            base_damage,
            damage_modifier: String::new(),
            text: String::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.damage_modifier = modifier.into();
        self
    }

    /// Signature feeding the functional id: anything that changes gameplay.
    fn signature(&self, hasher: &mut impl Hasher) {
        self.name.hash(hasher);
        self.cost.hash(hasher);
        self.base_damage.hash(hasher);
        self.damage_modifier.hash(hasher);
        self.text.hash(hasher);
    }
}

/// How an ability participates in the game. Drives engine dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityCategory {
    /// Player-triggered; generates a `UseAbility` legal action.
    Activatable,
    /// Continuously alters a numeric context (`retreat_cost`,
    /// `damage_dealt`, `damage_taken`, `hp`, or a `global_*` variant).
    Modifier { context: String },
    /// Blocks a specific condition or effect.
    Guard,
    /// Event-triggered (`on_play`, `on_evolve`, `on_attach_energy`,
    /// `on_knockout`).
    Hook { trigger: String },
    /// Board-wide condition (`ability_lock`, `item_lock`, ...).
    Passive { kind: String },
}

/// An ability printed on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub name: String,
    pub text: String,
    /// The printed tag, e.g. "Ability" or "VSTAR Power".
    pub ability_type: String,
    pub category: AbilityCategory,
}

impl AbilityDef {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        category: AbilityCategory,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ability_type: "Ability".to_string(),
            category,
        }
    }

    fn signature(&self, hasher: &mut impl Hasher) {
        self.name.hash(hasher);
        self.text.hash(hasher);
    }
}

/// Weakness entry: the attacking type that multiplies damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weakness {
    pub energy_type: EnergyType,
    pub multiplier: i32,
}

/// Resistance entry: the attacking type that reduces damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resistance {
    pub energy_type: EnergyType,
    pub value: i32,
}

/// Immutable definition of a printed card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDef {
    pub card_def_id: CardDefId,
    pub name: String,
    pub supertype: Supertype,
    pub subtypes: Vec<Subtype>,
    pub hp: Option<i32>,
    pub types: SmallVec<[EnergyType; 2]>,
    pub weakness: Option<Weakness>,
    pub resistance: Option<Resistance>,
    pub retreat_cost: u8,
    pub evolves_from: Option<String>,
    pub attacks: Vec<AttackDef>,
    pub abilities: Vec<AbilityDef>,
    /// Energy-only fields.
    pub is_basic_energy: bool,
    pub energy_type: Option<EnergyType>,
    /// Types a special energy provides. Empty plus non-basic defaults to
    /// one Colorless at accounting time.
    pub provides: SmallVec<[EnergyType; 2]>,
}

impl CardDef {
    /// Start a Pokemon definition.
    #[must_use]
    pub fn pokemon(
        id: impl Into<CardDefId>,
        name: impl Into<String>,
        hp: i32,
        types: &[EnergyType],
    ) -> Self {
        Self {
            card_def_id: id.into(),
            name: name.into(),
            supertype: Supertype::Pokemon,
            subtypes: Vec::new(),
            hp: Some(hp),
            types: SmallVec::from_slice(types),
            weakness: None,
            resistance: None,
            retreat_cost: 0,
            evolves_from: None,
            attacks: Vec::new(),
            abilities: Vec::new(),
            is_basic_energy: false,
            energy_type: None,
            provides: SmallVec::new(),
        }
    }

    /// Start a Trainer definition.
    #[must_use]
    pub fn trainer(id: impl Into<CardDefId>, name: impl Into<String>, subtype: Subtype) -> Self {
        Self {
            card_def_id: id.into(),
            name: name.into(),
            supertype: Supertype::Trainer,
            subtypes: vec![subtype],
            hp: None,
            types: SmallVec::new(),
            weakness: None,
            resistance: None,
            retreat_cost: 0,
            evolves_from: None,
            attacks: Vec::new(),
            abilities: Vec::new(),
            is_basic_energy: false,
            energy_type: None,
            provides: SmallVec::new(),
        }
    }

    /// Start a basic energy definition.
    #[must_use]
    pub fn basic_energy(
        id: impl Into<CardDefId>,
        name: impl Into<String>,
        energy_type: EnergyType,
    ) -> Self {
        Self {
            card_def_id: id.into(),
            name: name.into(),
            supertype: Supertype::Energy,
            subtypes: Vec::new(),
            hp: None,
            types: SmallVec::new(),
            weakness: None,
            resistance: None,
            retreat_cost: 0,
            evolves_from: None,
            attacks: Vec::new(),
            abilities: Vec::new(),
            is_basic_energy: true,
            energy_type: Some(energy_type),
            provides: SmallVec::from_slice(&[energy_type]),
        }
    }

    // === Builder helpers ===

    #[must_use]
    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtypes.push(subtype);
        self
    }

    #[must_use]
    pub fn with_weakness(mut self, energy_type: EnergyType) -> Self {
        self.weakness = Some(Weakness {
            energy_type,
            multiplier: 2,
        });
        self
    }

    #[must_use]
    pub fn with_resistance(mut self, energy_type: EnergyType) -> Self {
        self.resistance = Some(Resistance {
            energy_type,
            value: -30,
        });
        self
    }

    #[must_use]
    pub fn with_retreat_cost(mut self, cost: u8) -> Self {
        self.retreat_cost = cost;
        self
    }

    #[must_use]
    pub fn with_evolves_from(mut self, name: impl Into<String>) -> Self {
        self.evolves_from = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_attack(mut self, attack: AttackDef) -> Self {
        self.attacks.push(attack);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDef) -> Self {
        self.abilities.push(ability);
        self
    }

    // === Predicates ===

    #[must_use]
    pub fn is_pokemon(&self) -> bool {
        self.supertype == Supertype::Pokemon
    }

    #[must_use]
    pub fn is_trainer(&self) -> bool {
        self.supertype == Supertype::Trainer
    }

    #[must_use]
    pub fn is_energy(&self) -> bool {
        self.supertype == Supertype::Energy
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: Subtype) -> bool {
        self.subtypes.contains(&subtype)
    }

    #[must_use]
    pub fn is_basic_pokemon(&self) -> bool {
        self.is_pokemon() && self.has_subtype(Subtype::Basic)
    }

    #[must_use]
    pub fn is_stage_1(&self) -> bool {
        self.has_subtype(Subtype::Stage1)
    }

    #[must_use]
    pub fn is_stage_2(&self) -> bool {
        self.has_subtype(Subtype::Stage2)
    }

    #[must_use]
    pub fn is_item(&self) -> bool {
        self.is_trainer() && self.has_subtype(Subtype::Item)
    }

    #[must_use]
    pub fn is_supporter(&self) -> bool {
        self.is_trainer() && self.has_subtype(Subtype::Supporter)
    }

    #[must_use]
    pub fn is_stadium(&self) -> bool {
        self.is_trainer() && self.has_subtype(Subtype::Stadium)
    }

    #[must_use]
    pub fn is_tool(&self) -> bool {
        self.is_trainer() && self.has_subtype(Subtype::Tool)
    }

    #[must_use]
    pub fn is_tera(&self) -> bool {
        self.has_subtype(Subtype::Tera)
    }

    #[must_use]
    pub fn hp_or_zero(&self) -> i32 {
        self.hp.unwrap_or(0)
    }

    /// Prizes awarded when this Pokemon is knocked out.
    #[must_use]
    pub fn prize_value(&self) -> u8 {
        if self.has_subtype(Subtype::Vmax) {
            3
        } else if self.has_subtype(Subtype::Ex)
            || self.has_subtype(Subtype::V)
            || self.has_subtype(Subtype::Vstar)
            || self.has_subtype(Subtype::Gx)
        {
            2
        } else {
            1
        }
    }

    /// Deduplication key for action generation.
    ///
    /// Same-name cards with different stats or text must hash differently;
    /// functionally identical printings must collide.
    #[must_use]
    pub fn functional_id(&self) -> u64 {
        // FxHasher is stable within a build, which is all dedup needs.
        let mut hasher = rustc_hash::FxHasher::default();
        self.name.hash(&mut hasher);
        self.supertype.hash(&mut hasher);
        self.hp.hash(&mut hasher);
        for subtype in &self.subtypes {
            subtype.hash(&mut hasher);
        }
        for attack in &self.attacks {
            attack.signature(&mut hasher);
        }
        for ability in &self.abilities {
            ability.signature(&mut hasher);
        }
        self.is_basic_energy.hash(&mut hasher);
        self.energy_type.hash(&mut hasher);
        self.provides.hash(&mut hasher);
        hasher.finish()
    }
}
