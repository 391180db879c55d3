//! # Subscriber trait.
//!
//! [`Subscribe`] is how callers observe a batch while it runs: attempt starts,
//! failures, retry decisions and round boundaries.
//!
//! A subscriber is driven by its own worker with a bounded queue and can never
//! change an [`Outcome`](crate::Outcome). When the queue is full, most events
//! are dropped for that subscriber only and a `SubscriberOverflow` event is
//! published on the bus instead. `TaskFailed` and `RetryScheduled` are never
//! dropped: the failing attempt waits for queue space.

use async_trait::async_trait;

use crate::events::Event;

/// Receives executor events.
///
/// Events arrive in publication order. A panic inside [`on_event`](Self::on_event)
/// is caught and reported as `SubscriberPanicked`; the worker keeps going with
/// the next event.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns `false` for events this subscriber does not care about.
    ///
    /// Checked at publish time, so filtered events never take queue space.
    fn accepts(&self, event: &Event) -> bool {
        let _ = event;
        true
    }

    /// Queue size for this subscriber (at least 1 is used).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
