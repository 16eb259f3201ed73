//! # Module specification for supervised execution.
//!
//! Defines [`ModuleSpec`]: a bundle describing how a module runs inside the
//! bar (schedule, per-tick timeout, click action admission).
//!
//! A spec can be created:
//! - **Explicitly** with [`ModuleSpec::new`] (no timeout, default admission)
//! - **From config** with [`ModuleSpec::with_defaults`] (inherit the tick timeout)
//! - **Fluently** with [`ModuleSpec::builder`] from a closure

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use super::module::{ModuleRef, TickContext};
use super::module_fn::ModuleFn;
use super::schedule::Schedule;
use crate::config::BarConfig;
use crate::core::ActionAdmission;
use crate::error::ModuleError;
use crate::output::Output;

/// Specification for running a module inside a [`Bar`](crate::Bar).
pub struct ModuleSpec {
    module: ModuleRef,
    schedule: Schedule,
    timeout: Option<Duration>,
    admission: ActionAdmission,
}

impl ModuleSpec {
    /// Creates a spec with explicit schedule, no tick timeout and
    /// [`ActionAdmission::DropIfRunning`].
    pub fn new(module: ModuleRef, schedule: Schedule) -> Self {
        Self {
            module,
            schedule,
            timeout: None,
            admission: ActionAdmission::default(),
        }
    }

    /// Creates a spec inheriting the tick timeout from the bar config.
    ///
    /// Uses `BarConfig::default_tick_timeout()` so that `0s` is treated as `None`.
    pub fn with_defaults(module: ModuleRef, schedule: Schedule, cfg: &BarConfig) -> Self {
        Self::new(module, schedule).with_timeout(cfg.default_tick_timeout())
    }

    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn admission(&self) -> ActionAdmission {
        self.admission
    }

    /// Returns a new spec with updated tick timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a new spec with updated click action admission.
    pub fn with_admission(mut self, admission: ActionAdmission) -> Self {
        self.admission = admission;
        self
    }

    pub(crate) fn into_parts(self) -> (ModuleRef, Schedule, Option<Duration>, ActionAdmission) {
        (self.module, self.schedule, self.timeout, self.admission)
    }

    /// Creates a builder for constructing a function-backed spec.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> ModuleSpecBuilder {
        ModuleSpecBuilder::new(name)
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("name", &self.name())
            .field("schedule", &self.schedule)
            .field("timeout", &self.timeout)
            .field("admission", &self.admission)
            .finish()
    }
}

/// Fluent builder for function-backed [`ModuleSpec`]s.
///
/// ```rust
/// use std::time::Duration;
/// use barvisor::{ModuleSpec, Output, Segment};
///
/// let spec = ModuleSpec::builder("uptime")
///     .every(Duration::from_secs(60))
///     .timeout(Duration::from_secs(2))
///     .build(|_ctx| async { Ok(Output::one(Segment::new("up"))) });
/// assert_eq!(spec.name(), "uptime");
/// ```
#[derive(Debug)]
pub struct ModuleSpecBuilder {
    name: Cow<'static, str>,
    schedule: Schedule,
    timeout: Option<Duration>,
    admission: ActionAdmission,
}

impl ModuleSpecBuilder {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            schedule: Schedule::manual(),
            timeout: None,
            admission: ActionAdmission::default(),
        }
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn every(self, period: Duration) -> Self {
        self.schedule(Schedule::every(period))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn admission(mut self, admission: ActionAdmission) -> Self {
        self.admission = admission;
        self
    }

    /// Builds the spec from a closure.
    pub fn build<F, Fut>(self, f: F) -> ModuleSpec
    where
        F: Fn(TickContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Output, ModuleError>> + Send + 'static,
    {
        let module = ModuleFn::arc(self.name.clone(), f);
        self.build_from_module(module)
    }

    /// Builds the spec from an existing module.
    pub fn build_from_module(self, module: ModuleRef) -> ModuleSpec {
        ModuleSpec::new(module, self.schedule)
            .with_timeout(self.timeout)
            .with_admission(self.admission)
    }
}
