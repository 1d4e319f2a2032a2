//! Per-player state: zones, board, turn flags, and the knowledge layer.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::{CardId, PlayerId};
use crate::cards::{CardDatabase, CardInstance};
use crate::zones::{Board, Zone};

/// Everything one player owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_id: PlayerId,

    pub deck: Zone,
    pub hand: Zone,
    pub discard: Zone,
    pub prizes: Zone,
    pub board: Board,

    // Once-per-turn flags, reset at turn start.
    pub supporter_played_this_turn: bool,
    pub energy_attached_this_turn: bool,
    pub retreated_this_turn: bool,
    pub stadium_played_this_turn: bool,
    // Once-per-game flags.
    pub vstar_used: bool,
    pub gx_used: bool,

    pub prizes_taken: u8,
    /// Bonus draws owed for opponent mulligans, spent as `MulliganDraw`
    /// actions when the engine runs in player-choice mulligan mode.
    pub pending_mulligan_draws: u8,

    /// Knowledge layer: the deck's initial composition as a functional-id
    /// multiset. Lets a searcher reason about what can still be in the deck
    /// without peeking at hidden order.
    pub initial_deck_composition: FxHashMap<u64, u32>,
    /// Instance id to functional id, for every card the player started with.
    pub instance_functional_ids: FxHashMap<CardId, u64>,
    /// Set when a deck-search step is pushed; the deck's order is public
    /// knowledge-free after the shuffle but its contents have been seen.
    pub has_searched_deck: bool,
}

impl PlayerState {
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            deck: Zone::deck(),
            hand: Zone::hand(),
            discard: Zone::discard(),
            prizes: Zone::prizes(),
            board: Board::new(),
            supporter_played_this_turn: false,
            energy_attached_this_turn: false,
            retreated_this_turn: false,
            stadium_played_this_turn: false,
            vstar_used: false,
            gx_used: false,
            prizes_taken: 0,
            pending_mulligan_draws: 0,
            initial_deck_composition: FxHashMap::default(),
            instance_functional_ids: FxHashMap::default(),
            has_searched_deck: false,
        }
    }

    /// Record the deck's starting composition. Called once at deck
    /// materialization, before any card moves.
    pub fn record_deck_knowledge(&mut self, db: &CardDatabase) {
        for card in &self.deck.cards {
            let Some(def) = db.get(&card.card_def_id) else {
                continue;
            };
            let fid = def.functional_id();
            *self.initial_deck_composition.entry(fid).or_insert(0) += 1;
            self.instance_functional_ids.insert(card.id.clone(), fid);
        }
    }

    /// Reset the once-per-turn flags and every in-play Pokemon's turn
    /// bookkeeping. Called at the start of this player's turn.
    pub fn reset_turn_flags(&mut self) {
        self.supporter_played_this_turn = false;
        self.energy_attached_this_turn = false;
        self.retreated_this_turn = false;
        self.stadium_played_this_turn = false;

        if let Some(active) = self.board.active.as_mut() {
            active.reset_turn_flags();
        }
        for poke in &mut self.board.bench {
            poke.reset_turn_flags();
        }
    }

    /// Age every in-play Pokemon by one turn.
    pub fn increment_turns_in_play(&mut self) {
        if let Some(active) = self.board.active.as_mut() {
            active.turns_in_play += 1;
        }
        for poke in &mut self.board.bench {
            poke.turns_in_play += 1;
        }
    }

    #[must_use]
    pub fn has_active(&self) -> bool {
        self.board.has_active()
    }

    #[must_use]
    pub fn has_any_pokemon_in_play(&self) -> bool {
        self.board.pokemon_in_play() > 0
    }

    #[must_use]
    pub fn find_pokemon(&self, id: &CardId) -> Option<&CardInstance> {
        self.board.find_pokemon(id)
    }

    pub fn find_pokemon_mut(&mut self, id: &CardId) -> Option<&mut CardInstance> {
        self.board.find_pokemon_mut(id)
    }

    /// Total instances this player currently holds, counting nested
    /// attachments and previous stages. Drives the conservation invariant.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        let zones = self.deck.count() + self.hand.count() + self.discard.count() + self.prizes.count();
        let board: usize = self
            .board
            .all_pokemon()
            .map(CardInstance::card_count)
            .sum();
        zones + board
    }
}
