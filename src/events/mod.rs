//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Bar` (shutdown, render), module actors (ticks),
//!   `ClickRouter` (clicks and actions), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the bar's subscriber listener, which fans out to the
//!   `SubscriberSet` and updates the `AliveTracker`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
