//! The root game state.
//!
//! `GameState` is the complete, self-contained snapshot: clone it and both
//! copies evolve independently; serialize it and the game can resume. The
//! RNG lives inside the state so rollouts from equal snapshots replay
//! identically. Move history and active effects use [`im::Vector`] so a
//! clone shares structure instead of copying the whole log.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::ids::{CardId, PlayerId};
use super::player::PlayerState;
use super::rng::GameRng;
use super::types::{GameOutcome, GamePhase};
use crate::cards::CardInstance;
use crate::stack::ResolutionStep;

/// A board-level ongoing effect (attack riders, one-turn buffs).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub name: String,
    pub source_card_id: CardId,
    pub target_player: Option<PlayerId>,
    pub target_card_id: Option<CardId>,
    /// Turns until expiry; -1 is permanent.
    pub duration_turns: i32,
    /// The effect counts down at the end of this player's turns.
    pub expires_for: PlayerId,
    pub created_turn: u32,
    pub created_phase: GamePhase,
    #[serde(default)]
    pub parameters: rustc_hash::FxHashMap<String, String>,
}

impl ActiveEffect {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source: CardId,
        duration_turns: i32,
        expires_for: PlayerId,
    ) -> Self {
        Self {
            name: name.into(),
            source_card_id: source,
            target_player: None,
            target_card_id: None,
            duration_turns,
            expires_for,
            created_turn: 0,
            created_phase: GamePhase::Main,
            parameters: rustc_hash::FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_target_card(mut self, target: CardId) -> Self {
        self.target_card_id = Some(target);
        self
    }

    #[must_use]
    pub fn with_target_player(mut self, target: PlayerId) -> Self {
        self.target_player = Some(target);
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Complete game state for a two-player game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: [PlayerState; 2],
    pub turn_count: u32,
    pub active_player: PlayerId,
    pub starting_player: PlayerId,
    pub phase: GamePhase,
    pub stadium: Option<CardInstance>,
    pub active_effects: Vector<ActiveEffect>,
    pub result: GameOutcome,
    pub winner: Option<PlayerId>,
    pub move_history: Vector<Action>,
    pub rng: GameRng,
    /// Pending sub-choices, resolved top-down.
    pub resolution_stack: Vec<ResolutionStep>,
}

impl GameState {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            players: [
                PlayerState::new(PlayerId::ZERO),
                PlayerState::new(PlayerId::ONE),
            ],
            turn_count: 0,
            active_player: PlayerId::ZERO,
            starting_player: PlayerId::ZERO,
            phase: GamePhase::Setup,
            stadium: None,
            active_effects: Vector::new(),
            result: GameOutcome::Ongoing,
            winner: None,
            move_history: Vector::new(),
            rng: GameRng::new(seed),
            resolution_stack: Vec::new(),
        }
    }

    // === Player access ===

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    #[must_use]
    pub fn opponent(&self, id: PlayerId) -> &PlayerState {
        self.player(id.opponent())
    }

    pub fn opponent_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        self.player_mut(id.opponent())
    }

    #[must_use]
    pub fn current_player(&self) -> &PlayerState {
        self.player(self.active_player)
    }

    pub fn current_player_mut(&mut self) -> &mut PlayerState {
        let id = self.active_player;
        self.player_mut(id)
    }

    // === Card lookup ===

    /// Find a card instance anywhere: zones, boards, stadium. Attached
    /// cards and previous stages are not searched; they move with their
    /// host.
    #[must_use]
    pub fn find_card(&self, id: &CardId) -> Option<&CardInstance> {
        for player in &self.players {
            if let Some(card) = player
                .hand
                .find_card(id)
                .or_else(|| player.deck.find_card(id))
                .or_else(|| player.discard.find_card(id))
                .or_else(|| player.prizes.find_card(id))
                .or_else(|| player.board.find_pokemon(id))
            {
                return Some(card);
            }
        }
        self.stadium.as_ref().filter(|s| &s.id == id)
    }

    // === Resolution stack ===

    pub fn push_step(&mut self, step: ResolutionStep) {
        self.resolution_stack.push(step);
    }

    pub fn pop_step(&mut self) -> Option<ResolutionStep> {
        self.resolution_stack.pop()
    }

    #[must_use]
    pub fn top_step(&self) -> Option<&ResolutionStep> {
        self.resolution_stack.last()
    }

    pub fn top_step_mut(&mut self) -> Option<&mut ResolutionStep> {
        self.resolution_stack.last_mut()
    }

    #[must_use]
    pub fn has_pending_steps(&self) -> bool {
        !self.resolution_stack.is_empty()
    }

    // === Active effects ===

    pub fn add_effect(&mut self, mut effect: ActiveEffect) {
        effect.created_turn = self.turn_count;
        effect.created_phase = self.phase;
        self.active_effects.push_back(effect);
    }

    /// Whether a named effect targets the given card (or is untargeted).
    #[must_use]
    pub fn has_effect_on(&self, name: &str, card: &CardId) -> bool {
        self.active_effects.iter().any(|e| {
            e.name == name && e.target_card_id.as_ref().map_or(true, |t| t == card)
        })
    }

    /// Count down and drop effects at the end of `player`'s turn.
    pub fn expire_effects_for(&mut self, player: PlayerId) {
        let mut remaining = Vector::new();
        for mut effect in std::mem::take(&mut self.active_effects) {
            if effect.expires_for != player || effect.duration_turns < 0 {
                remaining.push_back(effect);
                continue;
            }
            effect.duration_turns -= 1;
            if effect.duration_turns > 0 {
                remaining.push_back(effect);
            }
        }
        self.active_effects = remaining;
    }

    // === Game flow ===

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.result.is_over()
    }

    pub fn switch_active_player(&mut self) {
        self.active_player = self.active_player.opponent();
    }

    pub fn record_action(&mut self, action: &Action) {
        self.move_history.push_back(action.clone());
    }

    /// Total card instances across both players plus the stadium.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        let players: usize = self.players.iter().map(PlayerState::total_cards).sum();
        players + usize::from(self.stadium.is_some())
    }

    /// Every instance id in the state, nested attachments included.
    /// Supports the conservation and uniqueness checks.
    #[must_use]
    pub fn all_card_ids(&self) -> Vec<CardId> {
        let mut ids = Vec::new();
        for player in &self.players {
            for zone in [&player.deck, &player.hand, &player.discard, &player.prizes] {
                for card in &zone.cards {
                    card.visit_ids(&mut |id| ids.push(id.clone()));
                }
            }
            for poke in player.board.all_pokemon() {
                poke.visit_ids(&mut |id| ids.push(id.clone()));
            }
        }
        if let Some(stadium) = &self.stadium {
            stadium.visit_ids(&mut |id| ids.push(id.clone()));
        }
        ids
    }
}
