//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for producing fresh attempts of a unit of work
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task<T>>`)

mod task;
mod task_fn;

pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
