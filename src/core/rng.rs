//! Deterministic random number generation owned by the game state.
//!
//! ## Key properties
//!
//! - **Deterministic**: the same seed produces an identical sequence.
//! - **Clone-faithful**: cloning a `GameRng` copies its stream position, so
//!   a cloned state stepped with the same actions consumes the same draws
//!   and produces a bit-identical successor.
//! - **Serializable**: ChaCha8's word position gives O(1) state capture.
//!
//! The RNG lives inside [`GameState`](crate::core::GameState) rather than
//! the engine, so that randomness (shuffles, coin flips) is part of the
//! snapshot MCTS clones.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for shuffles and coin flips.
///
/// Uses ChaCha8 for speed while keeping high-quality randomness.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random usize in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Flip a coin: true = heads.
    pub fn flip_coin(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Capture the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl Serialize for GameRng {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.state().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = GameRngState::deserialize(deserializer)?;
        Ok(GameRng::from_state(&state))
    }
}

impl PartialEq for GameRng {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl Eq for GameRng {}

/// Serializable RNG state.
///
/// Uses the ChaCha8 word position so capture cost does not depend on how
/// many numbers have been drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}
