//! # Event subscriber trait.
//!
//! Anything that wants to watch the bar (log lines, counters, a debug
//! overlay) implements [`Subscribe`] and is handed to
//! [`BarBuilder::subscribers`](crate::BarBuilder::subscribers).
//!
//! The [`SubscriberSet`](super::SubscriberSet) gives every subscriber its own
//! worker and queue. A subscriber that falls behind loses events (reported
//! as `SubscriberOverflow`); one that panics keeps receiving later events
//! (the panic is reported as `SubscriberPanicked`). Neither ever slows down
//! module ticks or rendering.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use barvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct RenderCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for RenderCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::LineRendered {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "render-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of runtime events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event, on the subscriber's own worker task.
    ///
    /// Events arrive in publish order. Blocking here only delays this
    /// subscriber's queue.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic reports. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length before events are dropped for this subscriber (min 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
