//! # Renderer boundary.
//!
//! A [`Render`] receives every composite line the bar decided to paint. The
//! composer awaits each call before composing the next line, so an
//! implementation never sees two lines at once.
//!
//! - [`I3bar`] writes the i3bar/swaybar JSON protocol.
//! - [`Discard`] drops every line (headless runs).

use async_trait::async_trait;

use crate::error::RenderError;
use crate::output::CompositeLine;

pub mod i3bar;

pub use i3bar::I3bar;

/// Paints composite lines.
#[async_trait]
pub trait Render: Send + 'static {
    /// Displays `line`. An error stops the bar.
    async fn render(&mut self, line: &CompositeLine) -> Result<(), RenderError>;
}

/// Renderer that drops every line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

#[async_trait]
impl Render for Discard {
    async fn render(&mut self, line: &CompositeLine) -> Result<(), RenderError> {
        tracing::trace!(segments = line.len(), "discarding line");
        Ok(())
    }
}
