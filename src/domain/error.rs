//! # Errors
//!
//! Error taxonomy of the coordination layer. Decode failures are not errors
//! (the message is dropped) and await timeouts are ordinary outcomes, so
//! neither appears here.

use thiserror::Error;

/// Transport failures. Any of these stops the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("bus connection failed: {0}")]
    Connection(String),

    #[error("poll called before subscribe")]
    NotSubscribed,

    #[error("bus already subscribed")]
    AlreadySubscribed,

    #[error("bus subscription closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("action on `{0}` has no completion event to wait for")]
    NoCompletion(String),
}

#[derive(Debug, Error)]
pub enum DialogueError {
    /// Every attempt ran out without an understood answer.
    #[error("no answer understood for `{context}` after {attempts} attempt(s)")]
    TurnFailed { context: String, attempts: u32 },

    #[error("dialogue cancelled by shutdown")]
    Cancelled,

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl From<BusError> for DialogueError {
    fn from(err: BusError) -> Self {
        DialogueError::Action(ActionError::Bus(err))
    }
}

impl DialogueError {
    pub fn is_turn_failed(&self) -> bool {
        matches!(self, DialogueError::TurnFailed { .. })
    }
}
