//! Engine errors.
//!
//! `step` returns these instead of panicking; an MCTS driver treats any
//! error as "that action was not legal here" and prunes the branch.

use thiserror::Error;

use crate::core::{CardDefId, CardId};

#[derive(Debug, Error)]
pub enum EngineError {
    /// The action is not in `legal_actions` for the current state.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("no card definition with id {0}")]
    MissingDefinition(CardDefId),

    #[error("no card instance with id {0}")]
    MissingInstance(CardId),

    #[error("invalid evolution: {0}")]
    InvalidEvolution(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("insufficient energy for {0}")]
    InsufficientEnergy(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
