//! Reply and state publication.
//!
//! Publication is the only externally observable side effect of a
//! processed input, and it is never skipped, reordered, or batched. Two
//! channels carry it:
//!
//! - a `watch` channel for the current state: last-value semantics, so a
//!   late subscriber immediately sees the latest committed state;
//! - a `broadcast` channel for replies: replay-none, so a subscriber only
//!   observes replies emitted after it subscribed.

use automat_core::Reply;
use tokio::sync::{broadcast, watch};

pub(crate) struct Publisher<S, I> {
    state_tx: watch::Sender<S>,
    reply_tx: broadcast::Sender<Reply<S, I>>,
}

impl<S: Clone, I: Clone> Publisher<S, I> {
    pub(crate) fn new(initial: S, reply_capacity: usize) -> Self {
        let (state_tx, _) = watch::channel(initial);
        let (reply_tx, _) = broadcast::channel(reply_capacity.max(1));
        Self { state_tx, reply_tx }
    }

    /// Publishes one reply; the committed state is republished first when
    /// the reply records a transition. Every commit notifies state
    /// watchers, including self-transitions.
    pub(crate) fn publish(&self, reply: Reply<S, I>) {
        if let Some(to) = &reply.to_state {
            self.state_tx.send_replace(to.clone());
        }
        // No reply subscribers is fine.
        let _ = self.reply_tx.send(reply);
    }

    pub(crate) fn state(&self) -> S {
        self.state_tx.borrow().clone()
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<S> {
        self.state_tx.subscribe()
    }

    pub(crate) fn subscribe_replies(&self) -> broadcast::Receiver<Reply<S, I>> {
        self.reply_tx.subscribe()
    }
}
