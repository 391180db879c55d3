//! Event publication shared by the executor and its attempt workers.
//!
//! Every event goes to the [`Bus`] (for direct receivers) and, when the executor
//! was built with subscribers, straight into the [`SubscriberSet`] queues.
//! Failure and retry transitions wait for queue space; everything else is
//! dropped for a subscriber whose queue is full.

use std::sync::Arc;

use crate::events::{Bus, Event};
use crate::subscribers::SubscriberSet;

#[derive(Clone)]
pub(crate) struct Emitter {
    bus: Bus,
    subs: Option<Arc<SubscriberSet>>,
}

impl Emitter {
    pub(crate) fn new(bus: Bus, subs: Option<Arc<SubscriberSet>>) -> Self {
        Self { bus, subs }
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    pub(crate) async fn publish(&self, ev: Event) {
        if let Some(subs) = &self.subs {
            if ev.kind.is_lossless() {
                subs.deliver(ev.clone()).await;
            } else {
                subs.emit(ev.clone());
            }
        }
        self.bus.publish(ev);
    }

    pub(crate) fn subscribers(&self) -> Option<&SubscriberSet> {
        self.subs.as_deref()
    }
}
