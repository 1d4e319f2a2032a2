//! The in-play board: active slot plus bench.
//!
//! The bench limit is mutable state because stadiums can raise it (Area
//! Zero Underdepths takes it to 8 while a player has a Tera Pokemon).
//! When the limit shrinks below the bench count the engine decides which
//! Pokemon to discard; the board only enforces additions.

use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::core::CardId;

/// Default bench size.
pub const DEFAULT_BENCH_LIMIT: usize = 5;

/// A player's in-play Pokemon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub active: Option<CardInstance>,
    pub bench: Vec<CardInstance>,
    /// Current maximum bench size; stadium handlers may change it.
    pub bench_limit: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            active: None,
            bench: Vec::new(),
            bench_limit: DEFAULT_BENCH_LIMIT,
        }
    }
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn bench_count(&self) -> usize {
        self.bench.len()
    }

    #[must_use]
    pub fn can_add_to_bench(&self) -> bool {
        self.bench.len() < self.bench_limit
    }

    /// Add a Pokemon to the bench. Fails (returns the card back) if full.
    pub fn add_to_bench(&mut self, card: CardInstance) -> Result<(), CardInstance> {
        if self.can_add_to_bench() {
            self.bench.push(card);
            Ok(())
        } else {
            Err(card)
        }
    }

    /// Move a benched Pokemon into an empty active slot.
    ///
    /// Returns false if the active slot is occupied or the id is not on the
    /// bench.
    pub fn promote_to_active(&mut self, bench_id: &CardId) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(index) = self.bench.iter().position(|c| &c.id == bench_id) else {
            return false;
        };
        self.active = Some(self.bench.remove(index));
        true
    }

    /// Swap the active Pokemon with a benched one.
    ///
    /// Returns false if either slot is empty or the id is not on the bench.
    pub fn switch_active(&mut self, bench_id: &CardId) -> bool {
        if self.active.is_none() {
            return false;
        }
        let Some(index) = self.bench.iter().position(|c| &c.id == bench_id) else {
            return false;
        };
        let incoming = self.bench.remove(index);
        let outgoing = self.active.replace(incoming);
        if let Some(outgoing) = outgoing {
            self.bench.push(outgoing);
        }
        true
    }

    /// All in-play Pokemon: active first, then bench in order.
    pub fn all_pokemon(&self) -> impl Iterator<Item = &CardInstance> {
        self.active.iter().chain(self.bench.iter())
    }

    /// Mutable lookup of an in-play Pokemon by id.
    pub fn find_pokemon_mut(&mut self, id: &CardId) -> Option<&mut CardInstance> {
        if let Some(active) = self.active.as_mut() {
            if &active.id == id {
                return Some(active);
            }
        }
        self.bench.iter_mut().find(|c| &c.id == id)
    }

    /// Lookup of an in-play Pokemon by id.
    #[must_use]
    pub fn find_pokemon(&self, id: &CardId) -> Option<&CardInstance> {
        self.all_pokemon().find(|c| &c.id == id)
    }

    /// Remove an in-play Pokemon by id (active or bench), returning it.
    pub fn take_pokemon(&mut self, id: &CardId) -> Option<CardInstance> {
        if self.active.as_ref().is_some_and(|c| &c.id == id) {
            return self.active.take();
        }
        let index = self.bench.iter().position(|c| &c.id == id)?;
        Some(self.bench.remove(index))
    }

    #[must_use]
    pub fn pokemon_in_play(&self) -> usize {
        usize::from(self.active.is_some()) + self.bench.len()
    }
}
