//! # Broadcast bus for executor events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]. The executor and every attempt
//! worker publish into it; anything holding a receiver from [`Bus::subscribe`]
//! sees the events published after it subscribed.
//!
//! A receiver that falls more than `bus_capacity` events behind gets
//! `RecvError::Lagged(n)` and loses the `n` oldest events. Publishing with no
//! receiver drops the event.

use tokio::sync::broadcast;

use super::event::Event;

/// Multi-producer broadcast of [`Event`]s. Cloning shares the channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus buffering up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to current receivers without waiting.
    pub fn publish(&self, ev: Event) {
        // Err only means nobody is listening.
        let _ = self.tx.send(ev);
    }

    /// Opens a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of open receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn publish_without_receivers_is_dropped() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::TaskStarting));

        let mut rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn receivers_observe_events_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::TaskStarting).with_slot(0));
        bus.publish(Event::new(EventKind::TaskSucceeded).with_slot(0));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::TaskStarting);
        assert_eq!(second.kind, EventKind::TaskSucceeded);
        assert!(second.seq > first.seq);
    }
}
