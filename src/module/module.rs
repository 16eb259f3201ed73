//! # Module abstraction.
//!
//! This module defines the [`Module`] trait: a named producer that computes
//! its next [`Output`] once per tick. Scheduling, timeouts and failure
//! handling live in the runtime; a module only answers "what should I show
//! right now?".
//!
//! A module receives a [`TickContext`] whose token is cancelled when the tick
//! times out or the bar shuts down.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::refresh::Refresh;
use crate::error::ModuleError;
use crate::output::Output;

/// Per-tick context handed to [`Module::produce`].
#[derive(Clone, Debug)]
pub struct TickContext {
    /// Tick number (1-based, per module).
    pub tick: u64,
    /// Cancelled on tick timeout or shutdown.
    pub token: CancellationToken,
    /// Requests another tick of this module (now or after a delay).
    pub refresh: Refresh,
}

impl TickContext {
    /// Standalone context, mostly for calling a module outside of a bar.
    pub fn detached() -> Self {
        Self {
            tick: 1,
            token: CancellationToken::new(),
            refresh: Refresh::new(),
        }
    }
}

/// # Producer of display segments.
///
/// A `Module` has a stable [`name`](Module::name) and computes its current
/// [`Output`] in [`produce`](Module::produce). Errors are reported to the
/// runtime, which hides the module for that tick and keeps its schedule.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use barvisor::{Module, ModuleError, Output, Segment, TickContext};
///
/// struct Hello;
///
/// #[async_trait]
/// impl Module for Hello {
///     fn name(&self) -> &str { "hello" }
///
///     async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
///         Ok(Segment::new("hello").into())
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Returns a stable, human-readable module name.
    fn name(&self) -> &str;

    /// Computes the module's output for this tick.
    async fn produce(&self, ctx: &TickContext) -> Result<Output, ModuleError>;
}

/// Shared handle to a module.
pub type ModuleRef = Arc<dyn Module>;
