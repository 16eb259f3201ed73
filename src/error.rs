//! Error types used by the barvisor runtime, modules and renderers.
//!
//! - [`RuntimeError`]: errors that stop the bar itself.
//! - [`ModuleError`]: errors raised by a single module tick or click action.
//! - [`RenderError`]: errors raised by a [`Render`](crate::Render) implementation.
//!
//! Every enum provides `as_label` for logs.

use std::time::Duration;
use thiserror::Error;

use crate::command::CommandError;
use crate::sources::SourceError;

/// # Errors produced by the bar runtime.
///
/// These end [`Bar::run`](crate::Bar::run). They are reported once, after the
/// module actors were asked to stop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some modules were still inside a tick.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of modules that did not stop in time.
        stuck: Vec<String>,
    },

    /// The renderer failed; the bar cannot display anything anymore.
    #[error("renderer failed: {0}")]
    Render(#[from] RenderError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use barvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Render(_) => "runtime_render_failed",
        }
    }
}

/// # Errors produced by module ticks and click actions.
///
/// None of them is fatal: the actor turns them into an empty output and
/// keeps its schedule.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ModuleError {
    /// The tick exceeded its timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// A collaborator (command, parser, data source) failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The tick was cancelled because the bar is shutting down.
    #[error("context cancelled")]
    Canceled,
}

impl ModuleError {
    /// Builds a [`ModuleError::Fail`] from anything printable.
    pub fn fail(error: impl ToString) -> Self {
        ModuleError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use barvisor::ModuleError;
    /// use std::time::Duration;
    ///
    /// let err = ModuleError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "module_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ModuleError::Timeout { .. } => "module_timeout",
            ModuleError::Fail { .. } => "module_failed",
            ModuleError::Canceled => "module_canceled",
        }
    }
}

impl From<CommandError> for ModuleError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Timeout { timeout, .. } => ModuleError::Timeout { timeout },
            other => ModuleError::fail(other),
        }
    }
}

impl From<SourceError> for ModuleError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Command(cmd) => cmd.into(),
            other => ModuleError::fail(other),
        }
    }
}

/// # Errors produced by renderers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing to the bar transport failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be encoded for the transport.
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RenderError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RenderError::Io(_) => "render_io",
            RenderError::Encode(_) => "render_encode",
        }
    }
}
