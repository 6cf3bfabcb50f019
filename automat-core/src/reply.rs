//! Reply records: the published outcome of processing one input.

use serde::{Deserialize, Serialize};

/// The outcome of evaluating one input against the mapping.
///
/// Exactly one reply is published per processed input, in processing
/// order, whether or not a transition occurred. `from_state` is always
/// the state at the moment the input was evaluated; `to_state` is `None`
/// when no rule matched, in which case the state was left unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply<S, I> {
    /// The input that was evaluated.
    pub input: I,

    /// The state at evaluation time.
    pub from_state: S,

    /// The committed next state, or `None` if no rule matched.
    pub to_state: Option<S>,
}

impl<S, I> Reply<S, I> {
    /// Returns true if this reply records a committed transition.
    pub fn is_transition(&self) -> bool {
        self.to_state.is_some()
    }

    /// Returns true if the input matched no rule.
    pub fn is_no_match(&self) -> bool {
        self.to_state.is_none()
    }
}
