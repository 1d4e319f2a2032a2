//! Engine policy knobs.
//!
//! These settle rule points the card text leaves ambiguous, so different
//! rulesets (casual vs. tournament) can share one engine.

use serde::{Deserialize, Serialize};

/// Who wins when both players satisfy a win condition on the same step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiePolicy {
    /// The acting player wins.
    #[default]
    ActivePlayer,
    /// Tournament ruling: the game is a draw.
    Draw,
}

/// How the non-mulliganing player's bonus draws are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MulliganBonus {
    /// One card per opponent mulligan, drawn during setup.
    #[default]
    Automatic,
    /// The player chooses per card via `MulliganDraw` actions.
    PlayerChoice,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub simultaneous_win: TiePolicy,
    pub mulligan_bonus: MulliganBonus,
}
