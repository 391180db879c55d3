//! # Run a single attempt of a task.
//!
//! Executes one attempt of a [`Task`] under the concurrency gate and publishes
//! its lifecycle events.
//!
//! ## Event flow
//!
//! ```text
//! acquire permit ──► publish TaskStarting ──► task.spawn().await
//!                                                 │
//!                   Ok(v)                 ◄───────┤
//!                     └─► publish TaskSucceeded   │
//!                   Err(e) / panic        ◄───────┘
//!                     └─► publish TaskFailed
//! release permit (drop)
//! ```
//!
//! ## Rules
//! - The permit is held exactly while the body runs and is released on every
//!   exit path, including panics (the guard is dropped during unwinding).
//! - Always publishes **exactly one** terminal event: `TaskSucceeded` or `TaskFailed`.
//! - Panics in the factory or the body become [`TaskError::Panicked`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;

use crate::{
    core::{emitter::Emitter, slot::SlotId},
    error::TaskError,
    events::{Event, EventKind},
    tasks::{Task, TaskRef},
};

/// Identity of one attempt, used for event metadata.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Attempt {
    pub slot: SlotId,
    /// 1-based attempt number for the slot.
    pub number: u32,
    /// 1-based round the attempt belongs to.
    pub round: u32,
}

/// Executes a single attempt of `task`, holding a permit from `gate` while the body runs.
pub(crate) async fn run_attempt<T: Send + 'static>(
    task: TaskRef<T>,
    gate: Arc<Semaphore>,
    attempt: Attempt,
    emitter: Emitter,
) -> Result<T, TaskError> {
    let _permit = gate
        .acquire_owned()
        .await
        .map_err(|_closed| TaskError::fail("concurrency gate closed"))?;

    emitter
        .publish(attempt_event(EventKind::TaskStarting, task.as_ref(), attempt))
        .await;

    let res = match AssertUnwindSafe(async { task.spawn().await })
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(payload) => Err(TaskError::from_panic(payload)),
    };

    match res {
        Ok(value) => {
            emitter
                .publish(attempt_event(EventKind::TaskSucceeded, task.as_ref(), attempt))
                .await;
            Ok(value)
        }
        Err(err) => {
            publish_failed(&emitter, task.as_ref(), attempt, &err).await;
            Err(err)
        }
    }
}

/// Publishes `TaskFailed` with error details.
///
/// Waits for subscriber queue space; see [`EventKind::is_lossless`].
pub(crate) async fn publish_failed<T: 'static>(
    emitter: &Emitter,
    task: &dyn Task<T>,
    attempt: Attempt,
    err: &TaskError,
) {
    emitter
        .publish(attempt_event(EventKind::TaskFailed, task, attempt).with_reason(err.to_string()))
        .await;
}

/// Builds an attempt-scoped event (slot, task, attempt, round).
pub(crate) fn attempt_event<T: 'static>(kind: EventKind, task: &dyn Task<T>, attempt: Attempt) -> Event {
    Event::new(kind)
        .with_slot(attempt.slot.index())
        .with_task(task.name())
        .with_attempt(attempt.number)
        .with_round(attempt.round)
}
