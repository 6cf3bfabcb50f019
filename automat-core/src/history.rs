//! In-memory audit trail of processed inputs.
//!
//! The log answers "how did we get here" without being a persistence
//! layer: it retains a bounded window of the most recent transitions, in
//! exactly the order the engine processed them, and evicts the oldest
//! once full. Sequence numbers keep increasing across evictions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One processed input, as retained by the transition log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord<S, I> {
    /// Position in the automaton's total processing order, starting at 1.
    pub seq: u64,

    /// When the input was processed.
    pub at: DateTime<Utc>,

    /// The processed input.
    pub input: I,

    /// The state at evaluation time.
    pub from_state: S,

    /// The committed next state, or `None` if no rule matched.
    pub to_state: Option<S>,
}

/// Bounded log of the most recent transitions, oldest first.
#[derive(Debug, Clone)]
pub struct TransitionLog<S, I> {
    records: VecDeque<TransitionRecord<S, I>>,
    capacity: usize,
    next_seq: u64,
}

impl<S, I> TransitionLog<S, I> {
    /// An empty log retaining at most `capacity` records. A capacity of
    /// zero disables retention while keeping sequence numbering.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Appends one processed input, evicting the oldest record if the log
    /// is full. Returns the assigned sequence number.
    pub fn record(&mut self, input: I, from_state: S, to_state: Option<S>) -> u64 {
        self.next_seq += 1;
        if self.capacity == 0 {
            return self.next_seq;
        }

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(TransitionRecord {
            seq: self.next_seq,
            at: Utc::now(),
            input,
            from_state,
            to_state,
        });
        self.next_seq
    }

    /// Iterates retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord<S, I>> {
        self.records.iter()
    }

    /// The most recent record, if any is retained.
    pub fn last(&self) -> Option<&TransitionRecord<S, I>> {
        self.records.back()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The retention capacity this log was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<S: Clone, I: Clone> TransitionLog<S, I> {
    /// Clones the retained records, oldest first.
    pub fn snapshot(&self) -> Vec<TransitionRecord<S, I>> {
        self.records.iter().cloned().collect()
    }
}
