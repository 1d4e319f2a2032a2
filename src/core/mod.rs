//! Core value types: ids, enums, actions, RNG, player and game state.

pub mod action;
pub mod ids;
pub mod player;
pub mod rng;
pub mod state;
pub mod types;

pub use action::{Action, ActionKind};
pub use ids::{CardDefId, CardId, PlayerId};
pub use player::PlayerState;
pub use rng::{GameRng, GameRngState};
pub use state::{ActiveEffect, GameState};
pub use types::{
    EnergyType, GameOutcome, GamePhase, SelectionPurpose, StatusCondition, StatusSet, Subtype,
    Supertype, ZoneKind,
};
