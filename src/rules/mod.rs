//! Turn structure, legality and state transition rules.

mod actions;
pub mod config;
pub mod damage;
pub mod engine;
mod resolution;

pub use config::{EngineConfig, MulliganBonus, TiePolicy};
pub use engine::Engine;
