//! Ordered card containers with visibility flags.
//!
//! A zone owns its card instances. Moving a card between zones is always
//! take-then-add so an instance never appears in two places. Decks keep
//! their order meaningful (top = end of the vector); hands do not.

use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::core::{CardId, GameRng};

/// An ordered sequence of card instances plus visibility flags.
///
/// The canonical zones:
///
/// | Zone    | ordered | hidden | private |
/// |---------|---------|--------|---------|
/// | Deck    | yes     | yes    | no      |
/// | Hand    | no      | no     | yes     |
/// | Discard | yes     | no     | no      |
/// | Prizes  | yes     | yes    | no      |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub cards: Vec<CardInstance>,
    /// Order matters (deck, discard).
    pub ordered: bool,
    /// Opponent cannot see the cards.
    pub hidden: bool,
    /// Only the owner may inspect.
    pub private: bool,
}

impl Zone {
    #[must_use]
    pub fn deck() -> Self {
        Self {
            cards: Vec::new(),
            ordered: true,
            hidden: true,
            private: false,
        }
    }

    #[must_use]
    pub fn hand() -> Self {
        Self {
            cards: Vec::new(),
            ordered: false,
            hidden: false,
            private: true,
        }
    }

    #[must_use]
    pub fn discard() -> Self {
        Self {
            cards: Vec::new(),
            ordered: true,
            hidden: false,
            private: false,
        }
    }

    #[must_use]
    pub fn prizes() -> Self {
        Self {
            cards: Vec::new(),
            ordered: true,
            hidden: true,
            private: false,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Append a card. For decks this is the top.
    pub fn add_card(&mut self, card: CardInstance) {
        self.cards.push(card);
    }

    /// Insert at the bottom (front) of an ordered zone.
    pub fn add_to_bottom(&mut self, card: CardInstance) {
        self.cards.insert(0, card);
    }

    /// Find a card by id without removing it.
    #[must_use]
    pub fn find_card(&self, id: &CardId) -> Option<&CardInstance> {
        self.cards.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.find_card(id).is_some()
    }

    /// Remove a card by id, returning it.
    pub fn take_card(&mut self, id: &CardId) -> Option<CardInstance> {
        let index = self.cards.iter().position(|c| &c.id == id)?;
        Some(self.cards.remove(index))
    }

    /// Draw the top card (deck convention: top = last).
    pub fn draw_top(&mut self) -> Option<CardInstance> {
        self.cards.pop()
    }

    /// Shuffle the zone with the state's RNG.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    fn card(id: &str) -> CardInstance {
        CardInstance::new(id, "def-1", PlayerId::ZERO)
    }

    #[test]
    fn test_take_card_removes_exactly_one() {
        let mut zone = Zone::hand();
        zone.add_card(card("a"));
        zone.add_card(card("b"));
        zone.add_card(card("c"));

        let taken = zone.take_card(&CardId::from("b")).unwrap();
        assert_eq!(taken.id, CardId::from("b"));
        assert_eq!(zone.count(), 2);
        assert!(zone.take_card(&CardId::from("b")).is_none());
    }

    #[test]
    fn test_deck_top_and_bottom() {
        let mut deck = Zone::deck();
        deck.add_card(card("bottom-ish"));
        deck.add_card(card("top"));
        deck.add_to_bottom(card("bottom"));

        assert_eq!(deck.draw_top().unwrap().id, CardId::from("top"));
        assert_eq!(deck.draw_top().unwrap().id, CardId::from("bottom-ish"));
        assert_eq!(deck.draw_top().unwrap().id, CardId::from("bottom"));
        assert!(deck.draw_top().is_none());
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let build = || {
            let mut deck = Zone::deck();
            for i in 0..40 {
                deck.add_card(card(&format!("c{i}")));
            }
            deck
        };

        let mut a = build();
        let mut b = build();
        a.shuffle(&mut GameRng::new(5));
        b.shuffle(&mut GameRng::new(5));
        assert_eq!(a, b);
    }
}
