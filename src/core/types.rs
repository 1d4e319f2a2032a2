//! Core enums shared across the engine.
//!
//! These are value types with no behavior beyond parsing and display:
//! supertypes and subtypes of card definitions, the nine energy types,
//! status conditions, game phases, outcomes, and the zone/selection tags
//! carried by resolution steps.

use serde::{Deserialize, Serialize};

/// Top-level card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Pokemon,
    Trainer,
    Energy,
}

/// Detailed card tags. A definition carries a set of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subtype {
    // Pokemon
    Basic,
    Stage1,
    Stage2,
    Tera,
    Ex,
    V,
    Vstar,
    Vmax,
    Gx,
    Mega,
    Ancient,
    Future,
    // Trainer
    Item,
    Supporter,
    Stadium,
    Tool,
    AceSpec,
}

impl Subtype {
    /// Parse the display form used in card text and filters.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Basic" => Subtype::Basic,
            "Stage 1" => Subtype::Stage1,
            "Stage 2" => Subtype::Stage2,
            "Tera" => Subtype::Tera,
            "ex" => Subtype::Ex,
            "V" => Subtype::V,
            "VSTAR" => Subtype::Vstar,
            "VMAX" => Subtype::Vmax,
            "GX" => Subtype::Gx,
            "Mega" => Subtype::Mega,
            "Ancient" => Subtype::Ancient,
            "Future" => Subtype::Future,
            "Item" => Subtype::Item,
            "Supporter" => Subtype::Supporter,
            "Stadium" => Subtype::Stadium,
            "Tool" => Subtype::Tool,
            "ACE SPEC" => Subtype::AceSpec,
            _ => return None,
        })
    }
}

/// The nine elemental types, shared by Pokemon and energy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyType {
    Grass,
    Fire,
    Water,
    Lightning,
    Psychic,
    Fighting,
    Darkness,
    Metal,
    Colorless,
}

impl EnergyType {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Grass" => EnergyType::Grass,
            "Fire" => EnergyType::Fire,
            "Water" => EnergyType::Water,
            "Lightning" => EnergyType::Lightning,
            "Psychic" => EnergyType::Psychic,
            "Fighting" => EnergyType::Fighting,
            "Darkness" => EnergyType::Darkness,
            "Metal" => EnergyType::Metal,
            "Colorless" => EnergyType::Colorless,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EnergyType::Grass => "Grass",
            EnergyType::Fire => "Fire",
            EnergyType::Water => "Water",
            EnergyType::Lightning => "Lightning",
            EnergyType::Psychic => "Psychic",
            EnergyType::Fighting => "Fighting",
            EnergyType::Darkness => "Darkness",
            EnergyType::Metal => "Metal",
            EnergyType::Colorless => "Colorless",
        }
    }
}

impl std::fmt::Display for EnergyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five special conditions an active Pokemon can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    Poisoned,
    Burned,
    Asleep,
    Paralyzed,
    Confused,
}

impl StatusCondition {
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Bitset of status conditions.
///
/// Add/remove/query are bitwise so clones and comparisons stay cheap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusSet(u8);

impl StatusSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn add(&mut self, status: StatusCondition) {
        self.0 |= status.bit();
    }

    pub fn remove(&mut self, status: StatusCondition) {
        self.0 &= !status.bit();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    #[must_use]
    pub const fn contains(self, status: StatusCondition) -> bool {
        self.0 & status.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Asleep or Paralyzed: the gate used by both the attack and retreat
    /// generators.
    #[must_use]
    pub const fn is_asleep_or_paralyzed(self) -> bool {
        self.0 & (StatusCondition::Asleep.bit() | StatusCondition::Paralyzed.bit()) != 0
    }
}

/// Game phases. Draw, Attack and Cleanup auto-advance; the rest accept
/// player actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    Mulligan,
    Draw,
    Main,
    Attack,
    Cleanup,
    End,
    SuddenDeath,
}

/// Terminal result of a game. `Ongoing` until a win condition fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    #[default]
    Ongoing,
    Player0Win,
    Player1Win,
    Draw,
}

impl GameOutcome {
    #[must_use]
    pub const fn win_for(player: super::ids::PlayerId) -> Self {
        match player.0 {
            0 => GameOutcome::Player0Win,
            _ => GameOutcome::Player1Win,
        }
    }

    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, GameOutcome::Ongoing)
    }
}

/// Zone tags used by resolution steps and filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Hand,
    Deck,
    Bench,
    Active,
    /// Active plus bench.
    Board,
    Discard,
}

/// Why a selection step exists. Drives default completion behavior when a
/// step carries no callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionPurpose {
    DiscardCost,
    SearchTarget,
    EvolutionBase,
    EvolutionStage,
    AttachTarget,
    BenchTarget,
    EnergyToAttach,
    SwitchTarget,
    RecoverToDeck,
    RecoverToHand,
    DiscardFromPlay,
}
