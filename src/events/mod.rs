//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the executor, its attempt workers
//! and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Executor` (execution/round events), `runner::run_attempt`
//!   (attempt events), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: anyone holding a receiver from [`Bus::subscribe`]. Subscribers
//!   registered on the executor get the same events through `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
