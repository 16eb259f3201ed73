//! # ModuleActor: one module, one task.
//!
//! Drives a single [`Module`](crate::Module): runs a tick, writes the result
//! into the module's slot, then sleeps until the schedule, a push trigger or
//! a refresh request asks for the next one.
//!
//! ```text
//! loop {
//!   ├─► publish TickStarting
//!   ├─► run_tick() ─► Ok(output)      → slot.emit(output)
//!   │              └► Err(Canceled)   → exit
//!   │              └► Err(Fail/Timeout) → slot.emit(empty)
//!   └─► select! { cancelled → exit, ticker.next(), refresh.requested() }
//! }
//! ```
//!
//! ## Rules
//! - Ticks of one module run **sequentially** (never in parallel).
//! - A failed tick hides the module until its next successful tick; the
//!   schedule keeps going.
//! - The first tick runs immediately on start.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::runner::{TickParams, run_tick};
use super::slot::SlotWriter;
use crate::events::{Bus, Event, EventKind};
use crate::module::{ModuleRef, Refresh, Schedule};
use crate::output::Output;

/// Parameters extracted from a [`ModuleSpec`](crate::ModuleSpec) by the bar.
pub(crate) struct ModuleActorParams {
    pub schedule: Schedule,
    pub timeout: Option<Duration>,
    pub refresh: Refresh,
}

/// Runs ticks of a single module and publishes their outputs.
pub(crate) struct ModuleActor {
    module: ModuleRef,
    name: Arc<str>,
    params: ModuleActorParams,
    slot: SlotWriter,
    bus: Bus,
}

impl ModuleActor {
    pub fn new(
        module: ModuleRef,
        name: Arc<str>,
        params: ModuleActorParams,
        slot: SlotWriter,
        bus: Bus,
    ) -> Self {
        Self {
            module,
            name,
            params,
            slot,
            bus,
        }
    }

    /// Runs until `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        let ModuleActor {
            module,
            name,
            params,
            slot,
            bus,
        } = self;
        let ModuleActorParams {
            schedule,
            timeout,
            refresh,
        } = params;
        let mut ticker = schedule.into_ticker();
        let mut tick: u64 = 0;

        loop {
            tick += 1;
            bus.publish(
                Event::new(EventKind::TickStarting)
                    .with_module(Arc::clone(&name))
                    .with_tick(tick),
            );

            let res = run_tick(
                module.as_ref(),
                TickParams {
                    name: &name,
                    parent: &token,
                    refresh: &refresh,
                    timeout,
                    tick,
                    bus: &bus,
                },
            )
            .await;
            if token.is_cancelled() {
                break;
            }
            slot.emit(res.unwrap_or_else(|_| Output::empty()));

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = refresh.requested() => {}
                _ = ticker.next() => {}
            }
        }
    }
}
