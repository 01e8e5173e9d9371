//! # Domain Types
//!
//! Common data structures shared between the bus adapters and the dispatch loop.

use serde::{Deserialize, Serialize};

/// A raw message as received from (or sent to) the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Result of waiting on a correlator handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Signaled,
    TimedOut,
    Cancelled,
}

impl Outcome {
    pub fn is_signaled(self) -> bool {
        self == Outcome::Signaled
    }
}

/// Lifecycle of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Stopped,
    Running,
    Stopping,
}
