//! # Per-subscriber queues and workers.
//!
//! [`SubscriberSet`] owns one bounded queue and one worker per [`Subscribe`]
//! implementation. Events reach the queues two ways:
//! - [`emit`](SubscriberSet::emit) uses `try_send` and never waits; a full
//!   queue drops the event for that subscriber.
//! - [`deliver`](SubscriberSet::deliver) awaits queue space. The executor uses
//!   it for [lossless](crate::EventKind::is_lossless) kinds, so every failure
//!   and retry decision is seen even when a large batch fails at once.
//!
//! ```text
//! emit/deliver(ev) ─┬─ accepts? ─► queue[0] ─► worker ─► LogWriter::on_event
//!                   ├─ accepts? ─► queue[1] ─► worker ─► custom::on_event
//!                   └─ ...                       └─ panic ─► Bus: SubscriberPanicked
//!   emit: queue full/closed ─► Bus: SubscriberOverflow
//! ```
//!
//! Overflow and panic reports go to the bus only; they are never queued to
//! subscribers, which keeps a stuck subscriber from feeding itself. A
//! subscriber that never returns from `on_event` stalls `deliver`, and with it
//! the attempt that failed.
//!
//! `AssertUnwindSafe` wraps the handler future: a subscriber that panics while
//! holding a lock may leave its own state poisoned.

use std::mem;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

#[derive(Clone)]
struct Queue {
    sub: Arc<dyn Subscribe>,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out of executor events to registered subscribers.
pub struct SubscriberSet {
    queues: RwLock<Vec<Queue>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Requires a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (queues, workers): (Vec<Queue>, Vec<JoinHandle<()>>) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let worker = tokio::spawn(drive(Arc::clone(&sub), rx, bus.clone()));
                (Queue { sub, tx }, worker)
            })
            .unzip();

        Self {
            queues: RwLock::new(queues),
            workers: Mutex::new(workers),
            bus,
        }
    }

    /// Returns `true` if no subscribers are registered or the set was shut down.
    pub fn is_empty(&self) -> bool {
        self.queues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Queues `event` for every subscriber that accepts it, without waiting.
    ///
    /// A full or closed queue drops the event for that subscriber and publishes
    /// `SubscriberOverflow` on the bus.
    pub fn emit(&self, event: Event) {
        let event = Arc::new(event);
        let queues = self.queues.read().unwrap_or_else(PoisonError::into_inner);

        for q in queues.iter().filter(|q| q.sub.accepts(&event)) {
            let reason = match q.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            self.report_overflow(&event, q.sub.name(), reason);
        }
    }

    /// Queues `event` for every subscriber that accepts it, waiting for space.
    ///
    /// Only a closed queue (after [`shutdown`](Self::shutdown)) loses the event.
    pub async fn deliver(&self, event: Event) {
        let event = Arc::new(event);
        let targets: Vec<Queue> = self
            .queues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|q| q.sub.accepts(&event))
            .cloned()
            .collect();

        for q in targets {
            if q.tx.send(Arc::clone(&event)).await.is_err() {
                self.report_overflow(&event, q.sub.name(), "closed");
            }
        }
    }

    fn report_overflow(&self, event: &Event, subscriber: &'static str, reason: &'static str) {
        if event.kind != EventKind::SubscriberOverflow {
            self.bus
                .publish(Event::subscriber_overflow(subscriber, reason));
        }
    }

    /// Closes every queue and waits until the workers have handled what was queued.
    ///
    /// Later `emit`/`deliver` calls reach no subscriber. Calling it twice is a no-op.
    pub async fn shutdown(&self) {
        let queues = mem::take(&mut *self.queues.write().unwrap_or_else(PoisonError::into_inner));
        drop(queues);

        let workers = mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));
        for worker in workers {
            let _ = worker.await;
        }
    }
}

async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, event: &Event) {
            if matches!(event.kind, EventKind::TaskFailed) {
                panic!("cannot handle failures");
            }
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_isolates_panics() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let recorder = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![recorder.clone(), Arc::new(Panicky)];
        let set = SubscriberSet::new(subs, bus.clone());

        set.emit(Event::new(EventKind::TaskStarting));
        set.emit(Event::new(EventKind::TaskFailed));
        set.emit(Event::new(EventKind::TaskSucceeded));
        set.shutdown().await;

        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec![
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::TaskSucceeded
            ]
        );

        let ev = bus_rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("panicky"));
        assert_eq!(ev.reason.as_deref(), Some("cannot handle failures"));
    }

    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            futures::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn full_queue_reports_overflow() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Stuck)];
        let set = SubscriberSet::new(subs, bus.clone());

        // The worker may or may not have pulled the first event yet; three
        // events into a queue of one overflow at least once either way.
        for _ in 0..3 {
            set.emit(Event::new(EventKind::TaskStarting));
        }

        let ev = bus_rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.reason.as_deref(), Some("subscriber=stuck reason=full"));
    }

    #[derive(Default)]
    struct FailuresOnly {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for FailuresOnly {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn accepts(&self, event: &Event) -> bool {
            event.kind == EventKind::TaskFailed
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn filtered_events_take_no_queue_space() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let only = Arc::new(FailuresOnly::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![only.clone()];
        let set = SubscriberSet::new(subs, bus.clone());

        for _ in 0..5 {
            set.emit(Event::new(EventKind::TaskStarting));
        }
        set.emit(Event::new(EventKind::TaskFailed));
        set.shutdown().await;

        assert_eq!(*only.seen.lock().unwrap(), vec![EventKind::TaskFailed]);
        assert!(bus_rx.try_recv().is_err(), "no overflow reported");
    }

    #[derive(Default)]
    struct Counter {
        seen: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            tokio::task::yield_now().await;
            self.seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        fn queue_capacity(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn deliver_waits_for_queue_space() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let counter = Arc::new(Counter::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![counter.clone()];
        let set = SubscriberSet::new(subs, bus.clone());

        for _ in 0..50 {
            set.deliver(Event::new(EventKind::TaskFailed)).await;
        }
        set.shutdown().await;

        assert_eq!(counter.seen.load(std::sync::atomic::Ordering::SeqCst), 50);
        assert!(bus_rx.try_recv().is_err(), "nothing dropped");
    }

    #[tokio::test]
    async fn shutdown_through_shared_handle_drains_and_is_idempotent() {
        let counter = Arc::new(Counter::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![counter.clone()];
        let set = Arc::new(SubscriberSet::new(subs, Bus::new(4)));
        let other = Arc::clone(&set);

        set.emit(Event::new(EventKind::TaskStarting));
        set.emit(Event::new(EventKind::TaskSucceeded));
        other.shutdown().await;
        assert_eq!(counter.seen.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert!(set.is_empty());

        set.emit(Event::new(EventKind::TaskStarting));
        set.shutdown().await;
        assert_eq!(counter.seen.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
