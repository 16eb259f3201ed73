//! # Event bus.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel. Module actors, the
//! composer, the click router and subscriber workers publish into it; the
//! bar's listener is the main receiver and fans events out to subscribers.
//!
//! Publishing never waits. The ring buffer is shared by all receivers: one
//! that lags more than the capacity skips the oldest events, and events
//! published while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Runtime event channel; clones share it.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, ev: Event) {
        // Err only means nobody is listening.
        let _ = self.tx.send(ev);
    }

    /// Receiver of the events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_sent_after_subscribing() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::TickStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::LineRendered));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::LineRendered);
    }
}
