//! The automaton: one state value, one input stream, one mapping.
//!
//! A dedicated driver task owns the authoritative state and the single
//! consumer end of the input queue. External producers and effect
//! feedback share the queue's sender, so all inputs merge into one
//! ordered sequence; the driver fully processes each input (evaluate,
//! commit, record, publish, schedule effect) before receiving the next.
//! That single-consumer structure is what makes state mutation exclusive:
//! there is no lock around the state because nothing else can reach it.

use crate::config::AutomatonConfig;
use crate::effects::EffectScheduler;
use crate::error::EngineError;
use crate::publish::Publisher;
use automat_core::{Feedback, Input, Mapping, Reply, State, TransitionLog, TransitionRecord};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// A running automaton coordinating one state value, one input stream,
/// and one composite mapping.
///
/// Constructed with [`Automaton::start`]; begins consuming immediately.
/// The handle is the only way to feed, observe, or tear down the machine:
/// there is no external state setter.
pub struct Automaton<S, I> {
    input_tx: mpsc::Sender<I>,
    publisher: Arc<Publisher<S, I>>,
    scheduler: Arc<EffectScheduler>,
    history: Arc<RwLock<TransitionLog<S, I>>>,
    shutdown: watch::Sender<bool>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl<S: State, I: Input> Automaton<S, I> {
    /// Builds and starts an automaton with the default configuration.
    pub fn start<M>(initial: S, mapping: M) -> Self
    where
        M: Mapping<S, I> + 'static,
    {
        Self::with_config(initial, mapping, AutomatonConfig::default())
    }

    /// Builds and starts an automaton with an explicit configuration.
    pub fn with_config<M>(initial: S, mapping: M, config: AutomatonConfig) -> Self
    where
        M: Mapping<S, I> + 'static,
    {
        let (input_tx, input_rx) = mpsc::channel(config.input_capacity.max(1));
        let publisher = Arc::new(Publisher::new(initial.clone(), config.reply_capacity));
        let scheduler = EffectScheduler::new();
        let history = Arc::new(RwLock::new(TransitionLog::new(config.history_capacity)));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let driver = Driver {
            current: initial,
            mapping,
            input_rx,
            feedback: Feedback::new(input_tx.clone()),
            publisher: Arc::clone(&publisher),
            scheduler: Arc::clone(&scheduler),
            history: Arc::clone(&history),
        };
        let handle = tokio::spawn(driver.run(shutdown_rx));

        Self {
            input_tx,
            publisher,
            scheduler,
            history,
            shutdown,
            driver: Mutex::new(Some(handle)),
        }
    }

    /// Builds and starts an automaton that drains `source` as its
    /// external input stream, alongside any effect feedback.
    pub fn with_source<M>(initial: S, mut source: mpsc::Receiver<I>, mapping: M) -> Self
    where
        M: Mapping<S, I> + 'static,
    {
        let automaton = Self::start(initial, mapping);
        let tx = automaton.input_tx.clone();
        tokio::spawn(async move {
            while let Some(input) = source.recv().await {
                if tx.send(input).await.is_err() {
                    break;
                }
            }
        });
        automaton
    }

    /// A clonable handle for feeding inputs from any producer thread or
    /// task. Inputs are admitted in send order per producer; admissions
    /// from concurrent producers interleave at the queue.
    pub fn sender(&self) -> InputSender<I> {
        InputSender {
            tx: self.input_tx.clone(),
        }
    }

    /// Queues one input, waiting for capacity if the queue is full.
    pub async fn send(&self, input: I) -> Result<(), EngineError> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| EngineError::Closed)
    }

    /// The latest committed state.
    pub fn state(&self) -> S {
        self.publisher.state()
    }

    /// Subscribes to state changes. The receiver immediately holds the
    /// current value; every commit notifies, including self-transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<S> {
        self.publisher.subscribe_state()
    }

    /// Subscribes to the reply stream: one reply per processed input, in
    /// processing order, starting from replies emitted after this call.
    pub fn subscribe_replies(&self) -> broadcast::Receiver<Reply<S, I>> {
        self.publisher.subscribe_replies()
    }

    /// Snapshot of the retained transition log, oldest first.
    pub fn history(&self) -> Vec<TransitionRecord<S, I>> {
        self.history.read().snapshot()
    }

    /// Number of effect runs currently in flight.
    pub fn in_flight_effects(&self) -> usize {
        self.scheduler.in_flight()
    }

    /// Aborts the most recent in-flight effect tagged `kind`, if any.
    /// Returns true if a run was cancelled. Inputs the effect already fed
    /// back stay in the queue; replies already published are unaffected.
    pub fn cancel_effects(&self, kind: &str) -> bool {
        self.scheduler.cancel_kind(kind)
    }

    /// Stops the driver and aborts all in-flight effects.
    ///
    /// Inputs queued but not yet processed are dropped without replies.
    /// Subsequent sends fail with [`EngineError::Closed`].
    pub async fn close(&self) {
        let _ = self.shutdown.send(true);
        self.scheduler.abort_all();
        let handle = self.driver.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl<S, I> Drop for Automaton<S, I> {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.scheduler.abort_all();
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
    }
}

/// A clonable producer handle into the automaton's input queue.
pub struct InputSender<I> {
    tx: mpsc::Sender<I>,
}

impl<I> InputSender<I> {
    /// Queues one input, waiting for capacity if the queue is full.
    pub async fn send(&self, input: I) -> Result<(), EngineError> {
        self.tx.send(input).await.map_err(|_| EngineError::Closed)
    }

    /// Non-blocking variant of [`send`](InputSender::send).
    pub fn try_send(&self, input: I) -> Result<(), EngineError> {
        self.tx.try_send(input).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EngineError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => EngineError::Closed,
        })
    }
}

impl<I> Clone for InputSender<I> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// The single consumer task. Owns the authoritative state and the
/// mapping; nothing outside this struct ever evaluates or mutates them.
struct Driver<S, I, M> {
    current: S,
    mapping: M,
    input_rx: mpsc::Receiver<I>,
    feedback: Feedback<I>,
    publisher: Arc<Publisher<S, I>>,
    scheduler: Arc<EffectScheduler>,
    history: Arc<RwLock<TransitionLog<S, I>>>,
}

impl<S: State, I: Input, M: Mapping<S, I>> Driver<S, I, M> {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                next = self.input_rx.recv() => match next {
                    Some(input) => self.process(input),
                    None => break,
                },
            }
        }
        // A process() step racing teardown may have scheduled one more
        // effect after the handle's abort; sweep again here.
        self.scheduler.abort_all();
        tracing::debug!("automaton driver stopped");
    }

    /// One full engine step: snapshot, evaluate, commit, record, publish,
    /// schedule. Completes before the next input is received.
    fn process(&mut self, input: I) {
        let from = self.current.clone();
        match self.mapping.map(&from, &input) {
            Some(transition) => {
                let (to, effect) = transition.into_parts();
                self.current = to.clone();
                tracing::debug!(?from, ?to, ?input, "transition");

                self.history
                    .write()
                    .record(input.clone(), from.clone(), Some(to.clone()));
                self.publisher.publish(Reply {
                    input,
                    from_state: from,
                    to_state: Some(to),
                });

                if let Some(effect) = effect {
                    EffectScheduler::spawn(&self.scheduler, effect, self.feedback.clone());
                }
            }
            None => {
                tracing::trace!(state = ?from, ?input, "input unmatched");

                self.history
                    .write()
                    .record(input.clone(), from.clone(), None);
                self.publisher.publish(Reply {
                    input,
                    from_state: from,
                    to_state: None,
                });
            }
        }
    }
}
