//! # Runtime events emitted by the executor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Execution events**: start/end of one `execute` call and of each round
//! - **Attempt events**: attempt lifecycle (starting, succeeded, failed, retry scheduled)
//! - **Subscriber events**: delivery problems inside the subscriber set
//!
//! The [`Event`] struct carries additional metadata such as timestamps, slot,
//! task name, attempt and round numbers, delays and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskrunner::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_slot(3)
//!     .with_task("fetch")
//!     .with_attempt(2)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.slot, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Execution events ===
    /// `execute` accepted its configuration and is about to launch tasks.
    ///
    /// Sets:
    /// - `tasks`: number of input tasks
    /// - `reason`: effective concurrency, e.g. `"tasks_limit=4"`
    ExecutionStarted,

    /// Every pending attempt of a round has completed.
    ///
    /// Sets:
    /// - `round`: 1-based round number
    /// - `reason`: summary, e.g. `"succeeded=3 failed=1 retrying=1"`
    RoundCompleted,

    /// The executor sleeps before starting the next round.
    ///
    /// Sets:
    /// - `round`: the round about to start
    /// - `delay_ms`: delay before the round (ms)
    RetryDelay,

    /// `execute` is returning its results.
    ///
    /// Sets:
    /// - `round`: number of rounds that ran
    /// - `reason`: summary, e.g. `"succeeded=5 failed=1"`
    ExecutionFinished,

    // === Attempt events ===
    /// An attempt acquired its permit and is starting its body.
    ///
    /// Sets: `slot`, `task`, `attempt` (1-based per slot), `round`
    TaskStarting,

    /// An attempt completed successfully.
    ///
    /// Sets: `slot`, `task`, `attempt`, `round`
    TaskSucceeded,

    /// An attempt failed (error returned or panic).
    ///
    /// Sets: `slot`, `task`, `attempt`, `round`, `reason` (error message)
    TaskFailed,

    /// A failed slot will be attempted again in the next round.
    ///
    /// Sets:
    /// - `slot`, `task`
    /// - `attempt`: the attempt that failed
    /// - `round`: the round the retry will run in
    /// - `reason`: last failure message
    RetryScheduled,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic info)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason` (e.g. "full", "closed")
    SubscriberOverflow,
}

impl EventKind {
    /// Failure and retry transitions.
    ///
    /// Subscribers receive these with backpressure instead of `try_send`, so a
    /// burst of failures is never dropped from a full queue.
    #[inline]
    pub fn is_lossless(self) -> bool {
        matches!(self, EventKind::TaskFailed | EventKind::RetryScheduled)
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Number of tasks in the batch (`ExecutionStarted` only).
    pub tasks: Option<usize>,
    /// Slot index (input position) of the task, if applicable.
    pub slot: Option<usize>,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Attempt count for the slot (starting from 1).
    pub attempt: Option<u32>,
    /// Round number (starting from 1).
    pub round: Option<u32>,
    /// Delay before the next round in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, summaries, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            tasks: None,
            slot: None,
            task: None,
            attempt: None,
            round: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches the batch size.
    #[inline]
    pub fn with_tasks(mut self, n: usize) -> Self {
        self.tasks = Some(n);
        self
    }

    /// Attaches a slot index.
    #[inline]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a round number.
    #[inline]
    pub fn with_round(mut self, n: u32) -> Self {
        self.round = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
