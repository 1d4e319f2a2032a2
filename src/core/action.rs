//! Actions: the wire type between the caller and the engine.
//!
//! One `Action` is one choice enumerated by `legal_actions` and consumed by
//! `step`. Actions are plain data: a kind, the choosing player, and up to
//! four optional payload fields, plus a free-form parameter map for
//! handler-specific extras (e.g. Rare Candy's Stage 2 instance id) and a
//! display label for consoles.
//!
//! Equality and hashing cover only the structural fields - kind, player,
//! card, target, attack name, ability name, choice index. The parameter map
//! and label are payload, not identity.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::ids::{CardId, PlayerId};

/// What an action does. Dispatch in the engine is by this kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    // Setup
    MulliganDraw,
    RevealHandMulligan,
    PlaceActive,
    PlaceBench,

    // Main phase
    PlayBasic,
    Evolve,
    AttachEnergy,
    PlayItem,
    PlaySupporter,
    PlayStadium,
    AttachTool,
    UseAbility,
    Retreat,

    // Turn flow
    Attack,
    EndTurn,

    // Reactions
    PromoteActive,

    // Resolution stack
    SelectCard,
    ConfirmSelection,
}

/// A complete game action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub player_id: PlayerId,
    pub card_id: Option<CardId>,
    pub target_id: Option<CardId>,
    pub attack_name: Option<String>,
    pub ability_name: Option<String>,
    pub choice_index: Option<usize>,
    /// Handler-specific payload, excluded from equality.
    #[serde(default)]
    pub parameters: FxHashMap<String, String>,
    /// Display label, excluded from equality.
    #[serde(default)]
    pub label: String,
}

impl Action {
    #[must_use]
    pub fn new(kind: ActionKind, player_id: PlayerId) -> Self {
        Self {
            kind,
            player_id,
            card_id: None,
            target_id: None,
            attack_name: None,
            ability_name: None,
            choice_index: None,
            parameters: FxHashMap::default(),
            label: String::new(),
        }
    }

    // === Constructors for each kind ===

    #[must_use]
    pub fn mulligan_draw(player: PlayerId) -> Self {
        Self::new(ActionKind::MulliganDraw, player)
    }

    #[must_use]
    pub fn reveal_hand_mulligan(player: PlayerId) -> Self {
        Self::new(ActionKind::RevealHandMulligan, player)
    }

    #[must_use]
    pub fn place_active(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::PlaceActive, player).with_card(card)
    }

    #[must_use]
    pub fn place_bench(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::PlaceBench, player).with_card(card)
    }

    #[must_use]
    pub fn play_basic(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::PlayBasic, player).with_card(card)
    }

    #[must_use]
    pub fn evolve(player: PlayerId, evolution: CardId, target: CardId) -> Self {
        Self::new(ActionKind::Evolve, player)
            .with_card(evolution)
            .with_target(target)
    }

    #[must_use]
    pub fn attach_energy(player: PlayerId, energy: CardId, target: CardId) -> Self {
        Self::new(ActionKind::AttachEnergy, player)
            .with_card(energy)
            .with_target(target)
    }

    #[must_use]
    pub fn play_item(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::PlayItem, player).with_card(card)
    }

    #[must_use]
    pub fn play_supporter(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::PlaySupporter, player).with_card(card)
    }

    #[must_use]
    pub fn play_stadium(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::PlayStadium, player).with_card(card)
    }

    #[must_use]
    pub fn attach_tool(player: PlayerId, tool: CardId, target: CardId) -> Self {
        Self::new(ActionKind::AttachTool, player)
            .with_card(tool)
            .with_target(target)
    }

    #[must_use]
    pub fn use_ability(player: PlayerId, pokemon: CardId, ability: impl Into<String>) -> Self {
        let mut action = Self::new(ActionKind::UseAbility, player).with_card(pokemon);
        action.ability_name = Some(ability.into());
        action
    }

    #[must_use]
    pub fn retreat(player: PlayerId, active: CardId, bench: CardId) -> Self {
        Self::new(ActionKind::Retreat, player)
            .with_card(active)
            .with_target(bench)
    }

    #[must_use]
    pub fn attack(player: PlayerId, active: CardId, attack: impl Into<String>) -> Self {
        let mut action = Self::new(ActionKind::Attack, player).with_card(active);
        action.attack_name = Some(attack.into());
        action
    }

    #[must_use]
    pub fn end_turn(player: PlayerId) -> Self {
        Self::new(ActionKind::EndTurn, player)
    }

    #[must_use]
    pub fn promote_active(player: PlayerId, bench: CardId) -> Self {
        Self::new(ActionKind::PromoteActive, player).with_card(bench)
    }

    #[must_use]
    pub fn select_card(player: PlayerId, card: CardId) -> Self {
        Self::new(ActionKind::SelectCard, player).with_card(card)
    }

    #[must_use]
    pub fn confirm_selection(player: PlayerId) -> Self {
        Self::new(ActionKind::ConfirmSelection, player)
    }

    // === Builder helpers ===

    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.card_id = Some(card);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: CardId) -> Self {
        self.target_id = Some(target);
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Distinguishes sibling actions whose structural fields would
    /// otherwise collide (equality ignores `parameters`).
    #[must_use]
    pub fn with_choice(mut self, index: usize) -> Self {
        self.choice_index = Some(index);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// The structural fields as a tuple, for equality and hashing.
    fn structural(
        &self,
    ) -> (
        ActionKind,
        PlayerId,
        Option<&CardId>,
        Option<&CardId>,
        Option<&str>,
        Option<&str>,
        Option<usize>,
    ) {
        (
            self.kind,
            self.player_id,
            self.card_id.as_ref(),
            self.target_id.as_ref(),
            self.attack_name.as_deref(),
            self.ability_name.as_deref(),
            self.choice_index,
        )
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.structural() == other.structural()
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.structural().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality_ignores_label_and_params() {
        let a = Action::play_item(PlayerId::ZERO, CardId::from("c1")).with_label("Play Nest Ball");
        let b = Action::play_item(PlayerId::ZERO, CardId::from("c1")).with_param("note", "x");
        assert_eq!(a, b);
    }

    #[test]
    fn test_target_distinguishes_actions() {
        let x = Action::play_supporter(PlayerId::ZERO, CardId::from("boss"))
            .with_target(CardId::from("benched_x"));
        let y = Action::play_supporter(PlayerId::ZERO, CardId::from("boss"))
            .with_target(CardId::from("benched_y"));
        assert_ne!(x, y);
    }

    #[test]
    fn test_kind_and_player_distinguish() {
        let a = Action::end_turn(PlayerId::ZERO);
        let b = Action::end_turn(PlayerId::ONE);
        assert_ne!(a, b);
        assert_ne!(Action::confirm_selection(PlayerId::ZERO), a);
    }
}
