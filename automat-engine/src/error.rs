//! Engine error types.

use thiserror::Error;

/// Errors from interacting with a running automaton.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The automaton's driver has stopped and no longer accepts inputs.
    #[error("automaton closed")]
    Closed,

    /// The input queue is at capacity (non-blocking sends only).
    #[error("input queue full")]
    QueueFull,
}
