//! Identifier newtypes.
//!
//! Three kinds of identity flow through the engine:
//! - `CardDefId`: which card *definition* (e.g., "sv1-181" Nest Ball)
//! - `CardId`: which card *instance* inside one game (e.g., "card_17")
//! - `PlayerId`: 0 or 1
//!
//! Definition ids key the immutable [`CardDatabase`](crate::cards::CardDatabase);
//! instance ids are minted at deck materialization and are unique within a game.
//! All three are plain value types: comparable, hashable, serializable.

use serde::{Deserialize, Serialize};

/// Identifier of a card definition in the database.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardDefId(pub String);

impl CardDefId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardDefId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardDefId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CardDefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a card instance within a single game.
///
/// Minted once per physical card when decks are materialized; an instance
/// keeps its id for the whole game no matter which zone it sits in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Player identifier for a two-player game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const ZERO: PlayerId = PlayerId(0);
    pub const ONE: PlayerId = PlayerId(1);

    /// Create a new player ID. Panics if `id` is not 0 or 1.
    #[must_use]
    pub fn new(id: u8) -> Self {
        assert!(id < 2, "PlayerId must be 0 or 1");
        Self(id)
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Raw 0-based index, for indexing per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Both players, in order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [PlayerId::ZERO, PlayerId::ONE].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}
