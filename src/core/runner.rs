//! # Run a single tick of a module.
//!
//! Executes one [`Module::produce`] call with optional timeout and publishes
//! its terminal event to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! Success:      produce() → Ok(output)    → TickFinished
//! Failure:      produce() → Err(Fail)     → TickFailed
//! Panic:        produce() panics          → TickFailed (caught, as Fail)
//! Timeout:      timeout elapsed → cancel child → TimeoutHit → TickFailed
//! Shutdown:     parent cancelled          → TickCanceled (future dropped)
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event.
//! - Derives a **child token** per tick; cancelling it never affects the parent.
//! - On timeout or shutdown the `produce` future is dropped, which kills
//!   subprocesses spawned with `kill_on_drop`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tracing::error;
use tokio_util::sync::CancellationToken;

use crate::error::ModuleError;
use crate::events::{Bus, Event, EventKind};
use crate::module::{Module, Refresh, TickContext};
use crate::output::Output;
use crate::subscribers::panic_message;

/// Everything [`run_tick`] needs besides the module itself.
pub(crate) struct TickParams<'a> {
    pub name: &'a Arc<str>,
    pub parent: &'a CancellationToken,
    pub refresh: &'a Refresh,
    pub timeout: Option<Duration>,
    pub tick: u64,
    pub bus: &'a Bus,
}

/// Executes tick number `p.tick` of `module`, publishing its terminal event.
pub(crate) async fn run_tick<M: Module + ?Sized>(
    module: &M,
    p: TickParams<'_>,
) -> Result<Output, ModuleError> {
    let child = p.parent.child_token();
    let ctx = TickContext {
        tick: p.tick,
        token: child.clone(),
        refresh: p.refresh.clone(),
    };

    let produce = async {
        tokio::select! {
            biased;
            _ = p.parent.cancelled() => Err(ModuleError::Canceled),
            res = AssertUnwindSafe(module.produce(&ctx)).catch_unwind() => match res {
                Ok(res) => res,
                Err(panic) => {
                    let info = panic_message(panic.as_ref());
                    error!(module = %p.name, tick = p.tick, %info, "module panicked");
                    Err(ModuleError::fail(format!("panicked: {info}")))
                }
            },
        }
    };

    let res = match p.timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, produce).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                p.bus.publish(
                    Event::new(EventKind::TimeoutHit)
                        .with_module(Arc::clone(p.name))
                        .with_tick(p.tick)
                        .with_timeout(dur),
                );
                Err(ModuleError::Timeout { timeout: dur })
            }
        },
        None => produce.await,
    };

    let ev = match &res {
        Ok(output) => Event::new(EventKind::TickFinished).with_segments(output.len()),
        Err(ModuleError::Canceled) => Event::new(EventKind::TickCanceled),
        Err(e) => Event::new(EventKind::TickFailed).with_reason(e.to_string()),
    };
    p.bus
        .publish(ev.with_module(Arc::clone(p.name)).with_tick(p.tick));
    res
}
