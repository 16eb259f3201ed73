//! # LogWriter: runtime events as `tracing` records
//!
//! A subscriber that turns every [`Event`] into one structured log record.
//! Routine tick traffic goes to `debug`/`trace`; failures, dropped clicks and
//! shutdown problems go to `warn`.
//!
//! ## Example output (fmt layer)
//! ```text
//! DEBUG barvisor::events: tick starting module="wifi" tick=12
//!  WARN barvisor::events: tick failed module="wifi" tick=12 reason="iwconfig exited with ..."
//!  WARN barvisor::events: tick timed out module="disk:/" tick=3 timeout_ms=10000
//!  INFO barvisor::events: button not handled module="wifi" button=Middle
//!  INFO barvisor::events: shutdown requested reason="signal"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let module = e.module.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::TickStarting => {
                trace!(target: "barvisor::events", module, tick = e.tick, "tick starting");
            }
            EventKind::TickFinished => {
                trace!(target: "barvisor::events", module, tick = e.tick, segments = e.segments, "tick finished");
            }
            EventKind::TickFailed => {
                warn!(target: "barvisor::events", module, tick = e.tick, reason, "tick failed");
            }
            EventKind::TimeoutHit => {
                warn!(target: "barvisor::events", module, tick = e.tick, timeout_ms = e.timeout_ms, "tick timed out");
            }
            EventKind::TickCanceled => {
                debug!(target: "barvisor::events", module, tick = e.tick, "tick canceled");
            }
            EventKind::LineRendered => {
                trace!(target: "barvisor::events", segments = e.segments, "line rendered");
            }
            EventKind::ClickUnresolved => {
                info!(target: "barvisor::events", button = ?e.button, reason, "click target not found");
            }
            EventKind::ClickUnhandled => {
                info!(target: "barvisor::events", module, button = ?e.button, "button not handled");
            }
            EventKind::ActionStarted => {
                debug!(target: "barvisor::events", module, button = ?e.button, "action started");
            }
            EventKind::ActionFinished => {
                debug!(target: "barvisor::events", module, button = ?e.button, "action finished");
            }
            EventKind::ActionDropped => {
                info!(target: "barvisor::events", module, button = ?e.button, "action dropped: another one is running");
            }
            EventKind::ActionFailed => {
                warn!(target: "barvisor::events", module, button = ?e.button, reason, "action failed");
            }
            EventKind::ShutdownRequested => {
                info!(target: "barvisor::events", reason, "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!(target: "barvisor::events", "all modules stopped within grace");
            }
            EventKind::GraceExceeded => {
                warn!(target: "barvisor::events", stuck = reason, "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "barvisor::events", subscriber = module, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "barvisor::events", subscriber = module, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
