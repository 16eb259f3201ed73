//! # Module abstractions and specifications.
//!
//! - [`Module`] - trait for producers of display segments
//! - [`ModuleFn`] - function-backed module implementation
//! - [`ModuleRef`] - shared reference to a module (`Arc<dyn Module>`)
//! - [`ModuleSpec`] - module bundled with its schedule and policies
//! - [`Schedule`] - periodic timers and push triggers
//! - [`Refresh`] - on-demand and one-shot ticks

#[allow(clippy::module_inception)]
mod module;
mod module_fn;
mod refresh;
mod schedule;
mod spec;

pub use module::{Module, ModuleRef, TickContext};
pub use module_fn::ModuleFn;
pub use refresh::Refresh;
pub use schedule::{Schedule, Trigger};
pub use spec::{ModuleSpec, ModuleSpecBuilder};
