//! Core error types.

use thiserror::Error;

/// Errors with which an effect run can terminate.
///
/// Effect failures are absorbed by the engine and logged; they never abort
/// the automaton. An author who wants a failure to be observable as a
/// transition sends a synthetic input through
/// [`Feedback`](crate::Feedback) before returning the error.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The automaton was torn down while the effect was still running.
    #[error("feedback channel closed")]
    FeedbackClosed,

    /// The effect's own work failed.
    #[error("effect failed: {reason}")]
    Failed { reason: String },
}

impl EffectError {
    /// Builds a [`EffectError::Failed`] from any displayable reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
