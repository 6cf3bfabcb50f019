//! Effect scheduling.
//!
//! Runs the effects authorized by committed transitions and tracks their
//! task handles so they can be cancelled: by per-mapping policy
//! (cancel-previous of the same kind), explicitly through the automaton
//! handle, or wholesale on teardown. Effects run independently of the
//! driver and never block input admission.

use automat_core::{CancelPolicy, Effect, Feedback};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

struct InFlight {
    handle: JoinHandle<()>,
    kind: Option<String>,
}

/// Registry of in-flight effect runs for one automaton.
pub(crate) struct EffectScheduler {
    running: DashMap<Uuid, InFlight>,
    /// Latest run id per kind tag, for cancel-previous correlation.
    kinds: DashMap<String, Uuid>,
}

impl EffectScheduler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            running: DashMap::new(),
            kinds: DashMap::new(),
        })
    }

    /// Spawns a fresh run of `effect`, applying its cancellation policy
    /// to any previous run of the same kind first.
    pub(crate) fn spawn<I: Send + 'static>(
        scheduler: &Arc<Self>,
        effect: Effect<I>,
        feedback: Feedback<I>,
    ) {
        let id = Uuid::new_v4();
        let kind = effect.kind_name().map(str::to_owned);

        if let (CancelPolicy::CancelPrevious, Some(kind)) = (effect.policy(), kind.as_deref()) {
            scheduler.cancel_kind(kind);
        }

        let run = effect.instantiate(feedback);
        let task_scheduler = Arc::clone(scheduler);
        let task_kind = kind.clone();
        let handle = tokio::spawn(async move {
            match run.await {
                Ok(()) => tracing::debug!(effect = %id, "effect completed"),
                Err(e) => tracing::warn!(effect = %id, error = %e, "effect failed"),
            }
            task_scheduler.finish(id, task_kind.as_deref());
        });

        if let Some(kind) = &kind {
            scheduler.kinds.insert(kind.clone(), id);
        }
        scheduler.running.insert(
            id,
            InFlight {
                handle,
                kind: kind.clone(),
            },
        );

        // The run may already have finished its own cleanup before the
        // handle was registered.
        let finished = scheduler
            .running
            .get(&id)
            .map(|entry| entry.handle.is_finished())
            .unwrap_or(false);
        if finished {
            scheduler.finish(id, kind.as_deref());
        }
    }

    /// Aborts the most recent in-flight run tagged `kind`. Returns true
    /// if a run was cancelled.
    pub(crate) fn cancel_kind(&self, kind: &str) -> bool {
        if let Some((_, id)) = self.kinds.remove(kind) {
            if let Some((_, in_flight)) = self.running.remove(&id) {
                in_flight.handle.abort();
                tracing::debug!(effect = %id, kind, "effect cancelled");
                return true;
            }
        }
        false
    }

    /// Aborts every in-flight run. Used on teardown.
    pub(crate) fn abort_all(&self) {
        for entry in self.running.iter() {
            entry.handle.abort();
        }
        self.running.clear();
        self.kinds.clear();
    }

    /// Number of runs currently in flight.
    pub(crate) fn in_flight(&self) -> usize {
        self.running.len()
    }

    fn finish(&self, id: Uuid, kind: Option<&str>) {
        self.running.remove(&id);
        if let Some(kind) = kind {
            // Only clear the kind slot if it still points at this run.
            self.kinds.remove_if(kind, |_, latest| *latest == id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automat_core::EffectError;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn feedback_pair() -> (Feedback<u32>, mpsc::Receiver<u32>) {
        let (tx, rx) = mpsc::channel(16);
        (Feedback::new(tx), rx)
    }

    #[tokio::test]
    async fn test_completed_run_leaves_registry() {
        let scheduler = EffectScheduler::new();
        let (feedback, mut rx) = feedback_pair();

        EffectScheduler::spawn(&scheduler, Effect::input(1u32), feedback);
        assert_eq!(rx.recv().await, Some(1));

        // Cleanup races the recv; yield until the registry drains.
        for _ in 0..100 {
            if scheduler.in_flight() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_kind_aborts_pending_run() {
        let scheduler = EffectScheduler::new();
        let (feedback, mut rx) = feedback_pair();

        let slow = Effect::new(|feedback: Feedback<u32>| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            feedback.send(99).await
        })
        .kind("slow");

        EffectScheduler::spawn(&scheduler, slow, feedback);
        assert_eq!(scheduler.in_flight(), 1);
        assert!(scheduler.cancel_kind("slow"));
        assert_eq!(scheduler.in_flight(), 0);

        // The aborted run never produces its input.
        assert!(tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .unwrap_or(None)
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_previous_policy_replaces_run() {
        let scheduler = EffectScheduler::new();
        let (feedback, mut rx) = feedback_pair();

        let make = |value: u32| {
            Effect::new(move |feedback: Feedback<u32>| async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                feedback.send(value).await
            })
            .kind("ping")
            .cancel_previous()
        };

        EffectScheduler::spawn(&scheduler, make(1), feedback.clone());
        EffectScheduler::spawn(&scheduler, make(2), feedback);

        // Only the replacement run survives to produce its input.
        assert_eq!(rx.recv().await, Some(2));
        assert!(tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap_or(None)
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_alive_lets_runs_overlap() {
        let scheduler = EffectScheduler::new();
        let (feedback, mut rx) = feedback_pair();

        let make = |value: u32| {
            Effect::new(move |feedback: Feedback<u32>| async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                feedback.send(value).await
            })
            .kind("ping")
        };

        EffectScheduler::spawn(&scheduler, make(1), feedback.clone());
        EffectScheduler::spawn(&scheduler, make(2), feedback);

        let mut seen = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_all_stops_everything() {
        let scheduler = EffectScheduler::new();
        let (feedback, mut rx) = feedback_pair();

        for _ in 0..3 {
            let effect = Effect::new(|feedback: Feedback<u32>| async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                feedback.send(1).await
            });
            EffectScheduler::spawn(&scheduler, effect, feedback.clone());
        }
        assert_eq!(scheduler.in_flight(), 3);

        scheduler.abort_all();
        assert_eq!(scheduler.in_flight(), 0);
        drop(feedback);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_failure_is_absorbed() {
        let scheduler = EffectScheduler::new();
        let (feedback, _rx) = feedback_pair();

        let failing = Effect::new(|_: Feedback<u32>| async move {
            Err(EffectError::failed("backend unavailable"))
        });
        EffectScheduler::spawn(&scheduler, failing, feedback);

        for _ in 0..100 {
            if scheduler.in_flight() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(scheduler.in_flight(), 0);
    }
}
