//! Automaton configuration.

/// Tuning knobs for one automaton instance.
///
/// All capacities are clamped to at least one slot at construction time;
/// history retention may be zero to disable the audit log.
#[derive(Debug, Clone)]
pub struct AutomatonConfig {
    /// Capacity of the merged input queue (external producers plus effect
    /// feedback). Producers experience backpressure once it is full.
    pub input_capacity: usize,

    /// Capacity of the reply broadcast channel. A subscriber falling more
    /// than this many replies behind observes a lag error on its receiver,
    /// never reordered or skipped publication.
    pub reply_capacity: usize,

    /// Number of transition records retained for audit. Zero disables.
    pub history_capacity: usize,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            input_capacity: 64,
            reply_capacity: 256,
            history_capacity: 256,
        }
    }
}

impl AutomatonConfig {
    /// Sets the merged input queue capacity.
    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity;
        self
    }

    /// Sets the reply broadcast capacity.
    pub fn with_reply_capacity(mut self, capacity: usize) -> Self {
        self.reply_capacity = capacity;
        self
    }

    /// Sets the audit log retention.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}
