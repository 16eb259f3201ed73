//! Runtime core: module actors, composition, click routing and lifecycle.
//!
//! The public API from this module is [`Bar`] (with [`BarBuilder`]),
//! [`ClickRouter`] / [`Dispatched`] and [`ActionAdmission`].
//!
//! Internal modules:
//! - [`runner`]: executes one tick with timeout/cancellation and event publishing;
//! - [`actor`]: drives one module through its schedule;
//! - [`slot`]: per-module output slots and the shared wake-up;
//! - [`composer`]: recomposes the line and feeds the renderer;
//! - [`router`]: resolves clicks and runs actions under per-module gates;
//! - [`registry`]: click targets by module index;
//! - [`alive`]: modules inside a tick, for shutdown reports;
//! - [`shutdown`]: OS signal handling;
//! - [`bar`]: ties everything together.

mod actor;
mod admission;
mod alive;
mod bar;
mod builder;
mod composer;
mod registry;
mod router;
mod runner;
mod shutdown;
mod slot;

pub use admission::ActionAdmission;
pub use bar::Bar;
pub use builder::BarBuilder;
pub use router::{ClickRouter, Dispatched};
