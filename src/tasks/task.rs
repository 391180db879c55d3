//! # Task abstraction.
//!
//! A [`Task`] is a factory: every call to [`Task::spawn`] produces a new,
//! independent future for one attempt. The executor calls it once for the
//! first attempt and once more for every retry of the same slot.
//!
//! The common handle type is [`TaskRef`], an `Arc<dyn Task<T>>` suitable for
//! sharing across the attempt workers.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

/// Shared handle to a task producing `T` on success.
pub type TaskRef<T> = Arc<dyn Task<T>>;

/// # Producer of deferred work.
///
/// # Example
/// ```
/// use taskrunner::{BoxTaskFuture, Task, TaskError};
///
/// struct Fetch {
///     url: String,
/// }
///
/// impl Task<usize> for Fetch {
///     fn name(&self) -> &str { &self.url }
///
///     fn spawn(&self) -> BoxTaskFuture<usize> {
///         let url = self.url.clone();
///         Box::pin(async move {
///             if url.is_empty() {
///                 return Err(TaskError::fail("empty url"));
///             }
///             Ok(url.len())
///         })
///     }
/// }
/// ```
pub trait Task<T>: Send + Sync + 'static {
    /// Returns a human-readable task name, used only for observability.
    fn name(&self) -> &str;

    /// Starts a new attempt.
    ///
    /// Must not share per-attempt state with earlier attempts; use `Arc<...>`
    /// explicitly inside the implementation if attempts need to communicate.
    fn spawn(&self) -> BoxTaskFuture<T>;
}
