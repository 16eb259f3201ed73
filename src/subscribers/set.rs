//! # SubscriberSet: one worker per subscriber.
//!
//! [`SubscriberSet::emit`] copies an [`Event`] into every subscriber's
//! bounded queue and returns; each subscriber drains its queue on its own
//! task.
//!
//! ```text
//! emit(&Event) ──► Arc<Event> ──┬──► [queue] ─► worker ─► LogWriter::on_event
//!                               └──► [queue] ─► worker ─► custom::on_event
//! ```
//!
//! Order is kept per subscriber only. A full queue drops the event for that
//! subscriber and reports `SubscriberOverflow`; a panic is caught and
//! reported as `SubscriberPanicked`. Reports about subscribers are never
//! reported again, so a broken subscriber cannot loop on its own failures.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use super::Subscribe;
use crate::events::{Bus, Event};

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out to subscribers through bounded per-subscriber queues.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Reports go to `bus`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (channels, workers) = subs
            .into_iter()
            .map(|sub| {
                let name = sub.name();
                let (sender, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let handle = tokio::spawn(worker(sub, rx, bus.clone()));
                (SubscriberChannel { name, sender }, handle)
            })
            .unzip();
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Queues `event` for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            warn!(subscriber = channel.name, reason, "subscriber dropped event");
            if !ev.is_subscriber_event() {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Closes the queues and waits until every worker drained its backlog.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

async fn worker(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    let name = sub.name();
    while let Some(ev) = rx.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(panic) = handled {
            let info = panic_message(panic.as_ref());
            warn!(subscriber = name, %info, "subscriber panicked");
            if !ev.is_subscriber_event() {
                bus.publish(Event::subscriber_panicked(name, info));
            }
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
