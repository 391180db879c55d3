//! # taskrunner
//!
//! **taskrunner** runs a batch of async tasks with bounded concurrency,
//! collects one outcome per task and optionally retries failures in rounds.
//!
//! It is meant for simple fan-out/fan-in work with admission control and basic
//! resilience, without a scheduler or a queue.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │  (slot #0)   │   │  (slot #1)   │   │  (slot #2)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Executor::execute                                                │
//! │  - RetryPolicy (validated from Config)                            │
//! │  - Semaphore gate (max(1, tasks_limit) permits)                   │
//! │  - round loop + result table (BTreeMap<SlotId, Outcome>)          │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ run_attempt  │   │ run_attempt  │   │ run_attempt  │
//!     │ (permit held │   │              │   │              │
//!     │  while body  │   │              │   │              │
//!     │  runs)       │   │              │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ TaskStarting / TaskSucceeded / TaskFailed
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │   Bus (broadcast)  +  SubscriberSet (per-subscriber queues)       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! execute(tasks)
//!   ├─► cfg.retry_policy()?            (ConfigError, nothing launched)
//!   ├─► spawn attempts for all slots (gate-limited)
//!   └─► loop while attempts in flight {
//!         ├─► join all of them
//!         ├─► record outcomes; spawn retries for failed slots if rounds remain
//!         └─► sleep(retry delay) while retries run, rounds_used += 1
//!       }
//!   └─► outcomes ordered by SlotId
//! ```
//!
//! Retry rounds are global, not per task: `retry_limit` bounds the number of
//! rounds after the first one, and each round retries every slot that failed
//! in the previous one.
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                   |
//! |-------------------|-------------------------------------------------------------|--------------------------------------|
//! | **Execution**     | Bounded fan-out with round-based retries.                   | [`Executor`], [`execute()`]          |
//! | **Results**       | Explicit success/failure per input position.                | [`Outcome`], [`SlotId`]              |
//! | **Tasks**         | Define tasks as closures or trait objects.                  | [`Task`], [`TaskFn`], [`TaskRef`]    |
//! | **Errors**        | Typed validation and task errors.                           | [`ConfigError`], [`TaskError`]       |
//! | **Configuration** | Concurrency, retries, bus capacity.                         | [`Config`], [`RetryPolicy`]          |
//! | **Events**        | Lifecycle events for logging/metrics.                       | [`Event`], [`Bus`], [`Subscribe`]    |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use taskrunner::{Config, Executor, Outcome, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default().with_tasks_limit(2).with_retries(1, 0);
//!     let executor = Executor::builder(cfg).with_default_subscribers().build();
//!
//!     let tasks: Vec<TaskRef<u64>> = (1..=4)
//!         .map(|n| -> TaskRef<u64> {
//!             TaskFn::arc(format!("square-{n}"), move || async move {
//!                 Ok::<_, TaskError>(n * n)
//!             })
//!         })
//!         .collect();
//!
//!     let outcomes = executor.execute(tasks).await?;
//!     assert_eq!(outcomes[3], Outcome::Success(16));
//!
//!     executor.shutdown().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{Executor, ExecutorBuilder, Outcome, SlotId, execute};
pub use error::{ConfigError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::RetryPolicy;
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};

// Optional: expose the tracing-backed logger subscriber.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
