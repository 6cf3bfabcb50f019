//! Effect descriptors: asynchronous work authorized by a transition.
//!
//! An effect never runs during mapping evaluation. When a rule carrying an
//! effect matches, the engine commits the transition, publishes the reply,
//! and only then spawns a fresh run of the effect. The run receives a
//! [`Feedback`] handle; any input it sends re-enters the automaton's
//! merged queue and is processed through the normal path, ordered by when
//! it was actually produced.

use crate::error::EffectError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Boxed future driven by the engine's effect scheduler.
pub type EffectFuture = Pin<Box<dyn Future<Output = Result<(), EffectError>> + Send>>;

type EffectFn<I> = Arc<dyn Fn(Feedback<I>) -> EffectFuture + Send + Sync>;

/// Handle an effect uses to feed inputs back into the automaton.
///
/// Normally handed to an effect run by the engine; constructing one
/// directly from an `mpsc::Sender` is useful for driving effects in
/// isolation in tests.
pub struct Feedback<I> {
    tx: mpsc::Sender<I>,
}

impl<I> Feedback<I> {
    /// Wraps a sender into the automaton's input queue.
    pub fn new(tx: mpsc::Sender<I>) -> Self {
        Self { tx }
    }

    /// Queues `input` behind whatever has already been admitted.
    ///
    /// Waits for queue capacity, so a fast effect cannot outrun the
    /// engine. Fails once the automaton is torn down.
    pub async fn send(&self, input: I) -> Result<(), EffectError> {
        self.tx
            .send(input)
            .await
            .map_err(|_| EffectError::FeedbackClosed)
    }
}

impl<I> Clone for Feedback<I> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<I> fmt::Debug for Feedback<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}

/// What to do with an earlier in-flight run of the same kind when a new
/// run is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Leave earlier runs going to completion.
    #[default]
    KeepAlive,

    /// Abort the previous in-flight run carrying the same kind tag.
    CancelPrevious,
}

/// An asynchronous unit of work authorized by a matched transition.
///
/// The wrapped closure is a factory: a fresh future is instantiated each
/// time the owning rule fires, so one rule may have several runs in
/// flight at once. Completion without producing inputs is absorbed by the
/// engine; failure is absorbed and logged, never escalated. Translating
/// a failure into a visible transition is done by sending a synthetic
/// input before returning the error.
pub struct Effect<I> {
    factory: EffectFn<I>,
    kind: Option<String>,
    policy: CancelPolicy,
}

impl<I> Effect<I> {
    /// Wraps an async factory into an effect with the default
    /// [`CancelPolicy::KeepAlive`] policy and no kind tag.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(Feedback<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EffectError>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move |feedback| Box::pin(factory(feedback))),
            kind: None,
            policy: CancelPolicy::default(),
        }
    }

    /// An effect that immediately feeds a single input back.
    pub fn input(input: I) -> Self
    where
        I: Clone + Send + Sync + 'static,
    {
        Self::new(move |feedback| {
            let input = input.clone();
            async move { feedback.send(input).await }
        })
    }

    /// Tags runs of this effect so cancellation can correlate them.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Aborts the previous in-flight run of the same kind before a new
    /// run starts. Requires a [`kind`](Effect::kind) tag to have any
    /// in-flight run to correlate with.
    pub fn cancel_previous(mut self) -> Self {
        self.policy = CancelPolicy::CancelPrevious;
        self
    }

    /// The kind tag, if one was set.
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The cancellation policy for runs of this effect.
    pub fn policy(&self) -> CancelPolicy {
        self.policy
    }

    /// Instantiates a fresh run of this effect.
    pub fn instantiate(&self, feedback: Feedback<I>) -> EffectFuture {
        (self.factory)(feedback)
    }
}

impl<I> Clone for Effect<I> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            kind: self.kind.clone(),
            policy: self.policy,
        }
    }
}

impl<I> fmt::Debug for Effect<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("kind", &self.kind)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
