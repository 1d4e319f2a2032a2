//! # ptcg-engine
//!
//! A Pokemon TCG rules engine built for MCTS self-play.
//!
//! ## Design Principles
//!
//! 1. **Two calls**: The public contract is `legal_actions(&state)` and
//!    `step(&state, &action)`. Everything a search needs flows through
//!    those two.
//!
//! 2. **State is data**: `GameState` is fully serializable and cheap to
//!    clone (`im-rs` vectors, seeded `ChaCha8` RNG). A cloned state
//!    replays identically.
//!
//! 3. **Logic lives in the registry**: The engine core knows zones,
//!    phases, the damage pipeline and the resolution stack. Card-specific
//!    behavior is registered by name in the `LogicRegistry`.
//!
//! ## Modules
//!
//! - `core`: IDs, actions, players, game state, RNG
//! - `cards`: Card definitions, instances, the database
//! - `zones`: Deck, hand, discard, prizes, board
//! - `stack`: The resolution stack for multi-step effects
//! - `effects`: Filters and reusable effect primitives
//! - `registry`: Card behavior callbacks, keyed by card name
//! - `rules`: Turn structure, legality, damage, win conditions
//! - `handlers`: Built-in card registrations

pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod rules;
pub mod stack;
pub mod zones;

// Re-export commonly used types
pub use crate::cards::{CardDatabase, CardDef, CardInstance};
pub use crate::core::{
    Action, ActionKind, CardDefId, CardId, GameOutcome, GamePhase, GameRng, GameRngState,
    GameState, PlayerId, PlayerState,
};
pub use crate::error::{EngineError, EngineResult};
pub use crate::registry::LogicRegistry;
pub use crate::rules::{Engine, EngineConfig, MulliganBonus, TiePolicy};
pub use crate::stack::{CompletionCallback, ResolutionStep};
pub use crate::zones::{Board, Zone};
