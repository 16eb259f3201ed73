//! # Function-backed module (`ModuleFn`)
//!
//! [`ModuleFn`] wraps a closure `F: Fn(TickContext) -> Fut`, producing a fresh
//! future per tick. State shared between ticks must be captured explicitly
//! (`Arc<...>`) inside the closure.
//!
//! ## Example
//! ```rust
//! use barvisor::{Module, ModuleFn, ModuleRef, Output, Segment};
//!
//! let m: ModuleRef = ModuleFn::arc("static", |_ctx| async move {
//!     Ok(Output::one(Segment::new("up")))
//! });
//!
//! assert_eq!(m.name(), "static");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::module::{Module, TickContext};
use crate::error::ModuleError;
use crate::output::Output;

/// Function-backed module implementation.
#[derive(Debug)]
pub struct ModuleFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ModuleFn<F> {
    /// Creates a new function-backed module.
    ///
    /// Prefer [`ModuleFn::arc`] when you immediately need a [`ModuleRef`](super::ModuleRef).
    pub fn new<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(TickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Output, ModuleError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the module and returns it as a shared handle.
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        F: Fn(TickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Output, ModuleError>> + Send + 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Module for ModuleFn<F>
where
    F: Fn(TickContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Output, ModuleError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, ctx: &TickContext) -> Result<Output, ModuleError> {
        (self.f)(ctx.clone()).await
    }
}
