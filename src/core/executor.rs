//! # Executor: bounded fan-out with round-based retries.
//!
//! The [`Executor`] runs a batch of tasks with at most `tasks_limit` bodies
//! executing at once, collects one [`Outcome`] per task and optionally re-runs
//! failed tasks in later rounds.
//!
//! ## State machine
//! ```text
//! validate config ──► Launching ──► RoundWait ──► RoundEvaluate ──┬──► RoundWait
//!   (ConfigError)     (all slots)   (join all)    (record, retry?) └──► Terminal
//! ```
//!
//! ## Round loop
//! ```text
//! inflight = spawn one attempt per slot (each waits for a gate permit)
//! while inflight is not empty:
//!   ├─► join ALL inflight attempts (full barrier, not earliest-first)
//!   ├─► for each completed attempt (slot order):
//!   │     ├─ Ok  ─► table[slot] = Success, slot settled
//!   │     └─ Err ─► table[slot] = Failure
//!   │              └─ policy.allows_round(rounds_used) ─► publish RetryScheduled
//!   ├─► inflight = spawn a fresh attempt for every scheduled slot
//!   └─► if inflight is not empty:
//!         ├─► publish RetryDelay, sleep(policy.delay)   (retries already running)
//!         └─► rounds_used += 1   (once per round, shared by all slots)
//! return table values ordered by SlotId
//! ```
//!
//! ## Rules
//! - Configuration errors are returned before any attempt is launched.
//! - Task failures never propagate; they are recorded as [`Outcome::Failure`].
//! - No attempt of round k+1 starts before every attempt of round k finished.
//!   Round k+1 attempts run while the executor sleeps; the delay is a lower
//!   bound on the time between the two joins, not a pause before retrying.
//! - Output has one entry per input task, in input order.
//!
//! ## Limitations
//! There is no per-attempt deadline and no global timeout: an attempt that
//! never completes blocks its round, and therefore `execute`, forever.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::{
    sync::Semaphore,
    task::{JoinError, JoinHandle},
};

use crate::{
    config::Config,
    core::{
        builder::ExecutorBuilder,
        emitter::Emitter,
        outcome::Outcome,
        runner::{Attempt, attempt_event, publish_failed, run_attempt},
        slot::SlotId,
    },
    error::{ConfigError, TaskError},
    events::{Bus, Event, EventKind},
    subscribers::{Subscribe, SubscriberSet},
    tasks::TaskRef,
};

/// Runs batches of tasks under a concurrency gate with optional retry rounds.
///
/// One executor can run any number of batches; every [`execute`](Self::execute)
/// call gets its own gate, round counter and result table.
pub struct Executor {
    cfg: Config,
    emitter: Emitter,
}

impl Executor {
    /// Creates an executor with the given config and subscribers.
    ///
    /// When `subscribers` is not empty this spawns their workers and must be
    /// called from within a tokio runtime.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = if subscribers.is_empty() {
            None
        } else {
            Some(Arc::new(SubscriberSet::new(subscribers, bus.clone())))
        };

        Self {
            cfg,
            emitter: Emitter::new(bus, subs),
        }
    }

    /// Returns a builder for an executor with the given config.
    pub fn builder(cfg: Config) -> ExecutorBuilder {
        ExecutorBuilder::new(cfg)
    }

    /// Returns the executor configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the event bus; use [`Bus::subscribe`] to observe events directly.
    pub fn bus(&self) -> &Bus {
        self.emitter.bus()
    }

    /// Runs `tasks` and returns one outcome per task, in input order.
    ///
    /// ### Errors
    /// [`ConfigError::InvalidRetryLimit`] / [`ConfigError::InvalidRetryTimeout`]
    /// when retries are enabled with an invalid limit or delay. Nothing is
    /// launched in that case.
    pub async fn execute<T: Send + 'static>(
        &self,
        tasks: Vec<TaskRef<T>>,
    ) -> Result<Vec<Outcome<T>>, ConfigError> {
        let policy = self.cfg.retry_policy()?;
        let limit = self.cfg.concurrency_limit();
        let gate = Arc::new(Semaphore::new(limit));

        self.emitter
            .publish(
                Event::new(EventKind::ExecutionStarted)
                    .with_tasks(tasks.len())
                    .with_reason(format!("tasks_limit={limit}")),
            )
            .await;

        let mut attempts = vec![0_u32; tasks.len()];
        let mut results: BTreeMap<SlotId, Outcome<T>> = BTreeMap::new();
        let mut rounds_used: u32 = 0;
        let mut round: u32 = 1;

        let all: Vec<SlotId> = (0..tasks.len()).map(SlotId::new).collect();
        let mut inflight = self.launch(&tasks, &gate, &mut attempts, &all, round);

        while !inflight.is_empty() {
            let (launched, handles): (Vec<Attempt>, Vec<JoinHandle<Result<T, TaskError>>>) =
                inflight.into_iter().unzip();
            let joined = join_all(handles).await;

            let mut retry = Vec::new();
            let (mut succeeded, mut failed) = (0_usize, 0_usize);

            for (attempt, res) in launched.into_iter().zip(joined) {
                let task = tasks[attempt.slot.index()].as_ref();
                let res = match res {
                    Ok(res) => res,
                    Err(join_err) => {
                        let err = join_failure(join_err);
                        publish_failed(&self.emitter, task, attempt, &err).await;
                        Err(err)
                    }
                };

                let outcome = match res {
                    Ok(value) => {
                        succeeded += 1;
                        Outcome::Success(value)
                    }
                    Err(err) => {
                        failed += 1;
                        if policy.allows_round(rounds_used) {
                            self.emitter
                                .publish(
                                    attempt_event(EventKind::RetryScheduled, task, attempt)
                                        .with_round(round + 1)
                                        .with_reason(err.to_string()),
                                )
                                .await;
                            retry.push(attempt.slot);
                        }
                        Outcome::Failure(err)
                    }
                };
                results.insert(attempt.slot, outcome);
            }

            self.emitter
                .publish(
                    Event::new(EventKind::RoundCompleted)
                        .with_round(round)
                        .with_reason(format!(
                            "succeeded={succeeded} failed={failed} retrying={}",
                            retry.len()
                        )),
                )
                .await;

            // Retries start right away and run during the delay; the next
            // join only happens once the delay is over.
            inflight = self.launch(&tasks, &gate, &mut attempts, &retry, round + 1);
            if !inflight.is_empty() {
                self.emitter
                    .publish(
                        Event::new(EventKind::RetryDelay)
                            .with_round(round + 1)
                            .with_delay(policy.delay()),
                    )
                    .await;
                tokio::time::sleep(policy.delay()).await;
                rounds_used += 1;
                round += 1;
            }
        }

        let failed = results.values().filter(|o| o.is_failure()).count();
        self.emitter
            .publish(
                Event::new(EventKind::ExecutionFinished)
                    .with_round(round)
                    .with_reason(format!(
                        "succeeded={} failed={failed}",
                        results.len() - failed
                    )),
            )
            .await;

        Ok(results.into_values().collect())
    }

    /// Spawns one attempt per slot in `slots`, all belonging to `round`.
    fn launch<T: Send + 'static>(
        &self,
        tasks: &[TaskRef<T>],
        gate: &Arc<Semaphore>,
        attempts: &mut [u32],
        slots: &[SlotId],
        round: u32,
    ) -> Vec<(Attempt, JoinHandle<Result<T, TaskError>>)> {
        slots
            .iter()
            .map(|&slot| {
                attempts[slot.index()] += 1;
                let attempt = Attempt {
                    slot,
                    number: attempts[slot.index()],
                    round,
                };
                let handle = tokio::spawn(run_attempt(
                    Arc::clone(&tasks[slot.index()]),
                    Arc::clone(gate),
                    attempt,
                    self.emitter.clone(),
                ));
                (attempt, handle)
            })
            .collect()
    }

    /// Stops subscriber workers after they drain their queues.
    ///
    /// Events emitted before this call are delivered before it returns. An
    /// attempt still running (its `execute` future was dropped) keeps
    /// publishing to the bus, but no longer reaches subscribers.
    pub async fn shutdown(self) {
        if let Some(set) = self.emitter.subscribers() {
            set.shutdown().await;
        }
    }
}

/// Converts a failed join of an attempt worker into a task failure.
fn join_failure(err: JoinError) -> TaskError {
    if err.is_panic() {
        TaskError::from_panic(err.into_panic())
    } else {
        TaskError::fail(err)
    }
}

/// Runs `tasks` with the given settings and no extra subscribers.
///
/// With the `logging` feature enabled, events are rendered through a
/// [`LogWriter`](crate::LogWriter).
///
/// ### Parameters
/// - `tasks`: tasks to execute, output keeps their order
/// - `tasks_limit`: number of tasks executing at once (`< 1` = 1)
/// - `retry_failures`: retry failed tasks in later rounds
/// - `retry_limit`: number of retry rounds (`>= 1` when retrying)
/// - `retry_timeout`: seconds to wait between rounds (`>= 0` when retrying)
///
/// ## Example
/// ```rust
/// use taskrunner::{Outcome, TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), taskrunner::ConfigError> {
/// let tasks: Vec<TaskRef<u32>> = vec![
///     TaskFn::arc("one", || async { Ok::<_, TaskError>(1) }),
///     TaskFn::arc("bad", || async { Err::<u32, _>(TaskError::fail("boom")) }),
/// ];
///
/// let out = taskrunner::execute(tasks, 2, false, 1, 10).await?;
/// assert_eq!(out[0], Outcome::Success(1));
/// assert!(out[1].is_failure());
/// # Ok(())
/// # }
/// ```
pub async fn execute<T: Send + 'static>(
    tasks: Vec<TaskRef<T>>,
    tasks_limit: i64,
    retry_failures: bool,
    retry_limit: i64,
    retry_timeout: i64,
) -> Result<Vec<Outcome<T>>, ConfigError> {
    let cfg = Config {
        tasks_limit,
        retry_failures,
        retry_limit,
        retry_timeout,
        ..Config::default()
    };
    let executor = Executor::builder(cfg).with_default_subscribers().build();
    let res = executor.execute(tasks).await;
    executor.shutdown().await;
    res
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::broadcast::Receiver;

    use super::*;
    use crate::tasks::TaskFn;

    fn fail_once(calls: Arc<AtomicUsize>) -> TaskRef<&'static str> {
        TaskFn::arc("fail-once", move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(TaskError::fail("first attempt"))
                } else {
                    Ok("recovered")
                }
            }
        })
    }

    fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn publishes_failure_and_retry_transitions() {
        let executor = Executor::new(Config::default().with_retries(1, 0), Vec::new());
        let mut rx = executor.bus().subscribe();

        let out = executor
            .execute(vec![fail_once(Arc::new(AtomicUsize::new(0)))])
            .await
            .unwrap();
        assert_eq!(out, vec![Outcome::Success("recovered")]);

        let events = drain(&mut rx);
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ExecutionStarted,
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::RetryScheduled,
                EventKind::RoundCompleted,
                EventKind::RetryDelay,
                EventKind::TaskStarting,
                EventKind::TaskSucceeded,
                EventKind::RoundCompleted,
                EventKind::ExecutionFinished,
            ]
        );

        assert_eq!(events[0].tasks, Some(1));
        assert_eq!(events[0].attempt, None);
        assert_eq!(events[0].reason.as_deref(), Some("tasks_limit=10"));

        let failed = &events[2];
        assert_eq!(failed.slot, Some(0));
        assert_eq!(failed.task.as_deref(), Some("fail-once"));
        assert_eq!(failed.attempt, Some(1));
        assert_eq!(failed.round, Some(1));
        assert_eq!(failed.reason.as_deref(), Some("execution failed: first attempt"));

        let scheduled = &events[3];
        assert_eq!(scheduled.attempt, Some(1));
        assert_eq!(scheduled.round, Some(2));

        let retried = &events[6];
        assert_eq!(retried.attempt, Some(2));
        assert_eq!(retried.round, Some(2));

        assert_eq!(events[9].round, Some(2));
        assert_eq!(events[9].reason.as_deref(), Some("succeeded=1 failed=0"));
    }

    #[tokio::test]
    async fn config_error_publishes_nothing() {
        let executor = Executor::new(Config::default().with_retries(1, -1), Vec::new());
        let mut rx = executor.bus().subscribe();

        let err = executor
            .execute(vec![fail_once(Arc::new(AtomicUsize::new(0)))])
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "invalid_retry_timeout");
        assert!(drain(&mut rx).is_empty());
    }

    #[derive(Default)]
    struct Failures {
        slots: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Subscribe for Failures {
        async fn on_event(&self, event: &Event) {
            if let (EventKind::TaskFailed, Some(slot)) = (event.kind, event.slot) {
                self.slots.lock().unwrap().push(slot);
            }
        }

        fn name(&self) -> &'static str {
            "failures"
        }
    }

    #[tokio::test]
    async fn subscribers_see_failures_before_shutdown_returns() {
        let failures = Arc::new(Failures::default());
        let executor = Executor::builder(Config::default().with_tasks_limit(1))
            .with_subscriber(failures.clone())
            .build();

        let ok: TaskRef<&'static str> = TaskFn::arc("ok", || async { Ok::<_, TaskError>("fine") });
        let out = executor
            .execute(vec![ok, fail_once(Arc::new(AtomicUsize::new(0)))])
            .await
            .unwrap();
        assert!(out[1].is_failure());

        executor.shutdown().await;
        assert_eq!(*failures.slots.lock().unwrap(), vec![1]);
    }

    #[derive(Default)]
    struct FailureCount(AtomicUsize);

    #[async_trait]
    impl Subscribe for FailureCount {
        async fn on_event(&self, event: &Event) {
            if event.kind == EventKind::TaskFailed {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn every_failure_reaches_subscribers_in_large_batches() {
        let count = Arc::new(FailureCount::default());
        let executor = Executor::builder(Config::default().with_tasks_limit(5000))
            .with_subscriber(count.clone())
            .build();

        let tasks: Vec<TaskRef<u32>> = (0..3000)
            .map(|i| -> TaskRef<u32> {
                TaskFn::arc(format!("fail-{i}"), || async {
                    Err::<u32, _>(TaskError::fail("nope"))
                })
            })
            .collect();

        let out = executor.execute(tasks).await.unwrap();
        assert_eq!(out.iter().filter(|o| o.is_failure()).count(), 3000);

        executor.shutdown().await;
        assert_eq!(count.0.load(Ordering::SeqCst), 3000);
    }

    #[derive(Default)]
    struct Kinds(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Kinds {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drains_even_with_an_attempt_left_running() {
        let kinds = Arc::new(Kinds::default());
        let executor = Executor::builder(Config::default())
            .with_subscriber(kinds.clone())
            .build();

        let stuck: TaskRef<u32> = TaskFn::arc("stuck", || async {
            futures::future::pending::<Result<u32, TaskError>>().await
        });
        let res = tokio::time::timeout(Duration::from_secs(1), executor.execute(vec![stuck])).await;
        assert!(res.is_err(), "execute never finishes");

        executor.shutdown().await;
        assert_eq!(
            *kinds.0.lock().unwrap(),
            vec![EventKind::ExecutionStarted, EventKind::TaskStarting]
        );
    }
}
