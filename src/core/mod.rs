//! Runtime core: the executor and its attempt workers.
//!
//! Internal modules:
//! - [`executor`]: validates config, drives rounds, collects ordered outcomes;
//! - [`runner`]: executes one attempt under the concurrency gate and publishes events;
//! - [`builder`]: fluent construction of an [`Executor`];
//! - [`emitter`]: event publication to the bus and subscriber set;
//! - [`outcome`], [`slot`]: per-slot result and identity types.

mod builder;
mod emitter;
mod executor;
mod outcome;
mod runner;
mod slot;

pub use builder::ExecutorBuilder;
pub use executor::{Executor, execute};
pub use outcome::Outcome;
pub use slot::SlotId;
