//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and the built-in [`LogWriter`].
//!
//! ```text
//! Event flow:
//!   ModuleActor ── publish(Event) ──► Bus ──► Bar listener
//!                                                │
//!                                                ├──► SubscriberSet::emit(&Event)
//!                                                │         │
//!                                                │    ┌────┴────┬─────────┐
//!                                                │    ▼         ▼         ▼
//!                                                │  LogWriter  Custom    ...
//!                                                │
//!                                                └──► AliveTracker (modules inside a tick)
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub(crate) use set::panic_message;
pub use subscriber::Subscribe;
