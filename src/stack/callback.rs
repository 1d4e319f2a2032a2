//! Completion callbacks for resolution steps.
//!
//! A callback runs when its step completes, receiving the game state, the
//! card database, the ids the player selected, and the choosing player. It
//! may push further steps, which is how multi-stage cards chain.
//!
//! Callbacks are closures over immutable captured data, shared by `Arc`.
//! Cloning a game state clones the stack and shares the closures, so clones
//! resolve identically. Serialization drops the callback. A state restored
//! from a snapshot mid-resolution falls back to the step's purpose-derived
//! default completion.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::cards::CardDatabase;
use crate::core::{CardId, GameState, PlayerId};

type CallbackFn = dyn Fn(&mut GameState, &CardDatabase, &[CardId], PlayerId) + Send + Sync;

/// Optional completion hook on a resolution step.
#[derive(Clone, Default)]
pub struct CompletionCallback(Option<Arc<CallbackFn>>);

impl CompletionCallback {
    /// No callback; the step's purpose drives default completion.
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn new(
        f: impl Fn(&mut GameState, &CardDatabase, &[CardId], PlayerId) + Send + Sync + 'static,
    ) -> Self {
        Self(Some(Arc::new(f)))
    }

    #[must_use]
    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    /// Invoke if present. Returns whether a callback ran.
    pub fn invoke(
        &self,
        state: &mut GameState,
        db: &CardDatabase,
        selected: &[CardId],
        player: PlayerId,
    ) -> bool {
        match &self.0 {
            Some(f) => {
                f(state, db, selected, player);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for CompletionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("CompletionCallback(set)"),
            None => f.write_str("CompletionCallback(none)"),
        }
    }
}

impl PartialEq for CompletionCallback {
    fn eq(&self, other: &Self) -> bool {
        // Closures cannot be compared structurally; two present callbacks
        // count as equal so same-seed replays (which allocate distinct
        // closures) still compare equal. This matches the serde design,
        // which drops the closure and reconstructs from the step's purpose.
        match (&self.0, &other.0) {
            (Some(_), Some(_)) | (None, None) => true,
            _ => false,
        }
    }
}

impl Serialize for CompletionCallback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The closure cannot be serialized; persist only its absence.
        serializer.serialize_none()
    }
}

impl<'de> Deserialize<'de> for CompletionCallback {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let _: Option<()> = Option::deserialize(deserializer)?;
        Ok(Self(None))
    }
}
