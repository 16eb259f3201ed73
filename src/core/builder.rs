use std::sync::Arc;

use super::bar::Bar;
use crate::config::BarConfig;
use crate::render::{Discard, Render};
use crate::subscribers::Subscribe;

/// Builder for constructing a [`Bar`].
pub struct BarBuilder {
    cfg: BarConfig,
    renderer: Option<Box<dyn Render>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl BarBuilder {
    pub fn new(cfg: BarConfig) -> Self {
        Self {
            cfg,
            renderer: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the renderer. Without one, lines are discarded.
    pub fn renderer(mut self, renderer: impl Render) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (ticks, clicks, shutdown) through
    /// dedicated workers with bounded queues.
    pub fn subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the bar. Modules are added afterwards with [`Bar::add`].
    pub fn build(self) -> Bar {
        let renderer = self.renderer.unwrap_or_else(|| Box::new(Discard));
        Bar::new_internal(self.cfg, renderer, self.subscribers)
    }
}
