//! # Logging subscriber backed by `tracing`.
//!
//! [`LogWriter`] renders every [`Event`] as a structured `tracing` record.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG taskrunner: starting slot=0 task="fetch" attempt=1 round=1
//!  WARN taskrunner: task failed slot=2 task="fetch" attempt=1 round=1 error="execution failed: boom"
//!  INFO taskrunner: retry scheduled slot=2 task="fetch" attempt=1 round=2
//!  INFO taskrunner: waiting before next round round=2 delay_ms=2000
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Structured logging subscriber.
///
/// Failures are logged at `warn`, retry decisions and delays at `info`,
/// everything else at `debug`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::ExecutionStarted => {
                debug!(target: "taskrunner", tasks = ?e.tasks, reason, "execution started");
            }
            EventKind::TaskStarting => {
                debug!(target: "taskrunner", slot = ?e.slot, task, attempt = ?e.attempt, round = ?e.round, "starting");
            }
            EventKind::TaskSucceeded => {
                debug!(target: "taskrunner", slot = ?e.slot, task, attempt = ?e.attempt, round = ?e.round, "task succeeded");
            }
            EventKind::TaskFailed => {
                warn!(target: "taskrunner", slot = ?e.slot, task, attempt = ?e.attempt, round = ?e.round, error = reason, "task failed");
            }
            EventKind::RetryScheduled => {
                info!(target: "taskrunner", slot = ?e.slot, task, attempt = ?e.attempt, round = ?e.round, "retry scheduled");
            }
            EventKind::RoundCompleted => {
                debug!(target: "taskrunner", round = ?e.round, reason, "round completed");
            }
            EventKind::RetryDelay => {
                info!(target: "taskrunner", round = ?e.round, delay_ms = ?e.delay_ms, "waiting before next round");
            }
            EventKind::ExecutionFinished => {
                debug!(target: "taskrunner", rounds = ?e.round, reason, "execution finished");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "taskrunner", subscriber = task, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "taskrunner", subscriber = task, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
