//! # Runtime events emitted by the bar, module actors and the click router.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Tick events**: module tick flow (starting, finished, failed, timeout)
//! - **Click events**: click resolution and action execution
//! - **Shutdown events**: shutdown request and grace outcome
//! - **Subscriber events**: delivery problems of subscribers themselves
//!
//! The [`Event`] struct carries additional metadata such as timestamps, module
//! name, tick number, reasons and the clicked button.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use barvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TickFailed)
//!     .with_module("wifi")
//!     .with_reason("iwconfig: not found")
//!     .with_tick(3)
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::TickFailed);
//! assert_eq!(ev.module.as_deref(), Some("wifi"));
//! assert_eq!(ev.reason.as_deref(), Some("iwconfig: not found"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::output::Button;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `module`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `module`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested (OS signal, explicit stop or renderer failure).
    ///
    /// Sets:
    /// - `reason`: what triggered it
    ShutdownRequested,

    /// All module actors stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some modules were still inside a tick.
    ///
    /// Sets:
    /// - `reason`: names of the stuck modules
    GraceExceeded,

    // === Tick events ===
    /// A module is starting a tick.
    ///
    /// Sets:
    /// - `module`: module name
    /// - `tick`: tick number (1-based, per module)
    TickStarting,

    /// A tick produced an output.
    ///
    /// Sets:
    /// - `module`, `tick`
    /// - `segments`: number of segments emitted
    TickFinished,

    /// A tick failed; the module is hidden until its next successful tick.
    ///
    /// Sets:
    /// - `module`, `tick`
    /// - `reason`: failure message
    TickFailed,

    /// A tick exceeded its timeout (always followed by `TickFailed`).
    ///
    /// Sets:
    /// - `module`, `tick`
    /// - `timeout_ms`: configured tick timeout
    TimeoutHit,

    /// A tick was abandoned because the bar is shutting down.
    ///
    /// Sets:
    /// - `module`, `tick`
    TickCanceled,

    // === Render events ===
    /// A composite line was handed to the renderer.
    ///
    /// Sets:
    /// - `segments`: number of segments in the line
    LineRendered,

    // === Click events ===
    /// The click target does not exist in the current line.
    ///
    /// Sets:
    /// - `button`
    /// - `reason`: the unresolved target
    ClickUnresolved,

    /// The clicked segment has no binding for the button.
    ///
    /// Sets:
    /// - `module`, `button`
    ClickUnhandled,

    /// A click action started.
    ///
    /// Sets:
    /// - `module`, `button`
    ActionStarted,

    /// A click action completed successfully.
    ///
    /// Sets:
    /// - `module`, `button`
    ActionFinished,

    /// A click action was dropped because another one of the same module was running.
    ///
    /// Sets:
    /// - `module`, `button`
    ActionDropped,

    /// A click action returned an error.
    ///
    /// Sets:
    /// - `module`, `button`
    /// - `reason`: failure message
    ActionFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Tick timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Tick number (starting from 1).
    pub tick: Option<u64>,
    /// Name of the module (or subscriber), if applicable.
    pub module: Option<Arc<str>>,
    /// Clicked button, for click events.
    pub button: Option<Button>,
    /// Number of segments, for tick and render events.
    pub segments: Option<usize>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            timeout_ms: None,
            reason: None,
            tick: None,
            module: None,
            button: None,
            segments: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a module name.
    #[inline]
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_tick(mut self, n: u64) -> Self {
        self.tick = Some(n);
        self
    }

    #[inline]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = Some(button);
        self
    }

    #[inline]
    pub fn with_segments(mut self, n: usize) -> Self {
        self.segments = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_module(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_module(subscriber)
            .with_reason(info)
    }

    /// True for events reporting subscriber delivery problems.
    ///
    /// These are never re-reported when they cannot be delivered themselves.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}
