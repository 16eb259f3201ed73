//! # Composer: slots → composite line → renderer.
//!
//! The composer is the single loop between module slots and the renderer.
//!
//! ```text
//! loop {
//!   ├─► wait for wake-up (or cancellation)
//!   ├─► scan slots: has_changed() → borrow_and_update()
//!   ├─► recompose CompositeLine (registration order)
//!   ├─► if line != last rendered → await renderer.render(&line)
//!   └─► publish line to ClickRouter (watch)
//! }
//! ```
//!
//! ## Rules
//! - At most one line is in flight to the renderer.
//! - Value-equal lines are rendered once.
//! - The router sees a line only once it is on screen, so clicks sent for
//!   the old line during a slow write still resolve against it.
//! - Repeats are still published to the router, so click bindings always
//!   come from the latest tick even when nothing was repainted.
//! - A renderer error ends the loop; the bar shuts down and reports it.

use std::sync::Arc;

use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;

use crate::error::RenderError;
use crate::events::{Bus, Event, EventKind};
use crate::output::{CompositeLine, Output};
use crate::render::Render;

/// Reader side of every slot plus the state needed to recompose.
pub(crate) struct Composer {
    names: Vec<Arc<str>>,
    slots: Vec<watch::Receiver<Output>>,
    outputs: Vec<Output>,
    wake: Arc<Notify>,
    line: watch::Sender<Arc<CompositeLine>>,
    bus: Bus,
}

impl Composer {
    pub fn new(
        names: Vec<Arc<str>>,
        slots: Vec<watch::Receiver<Output>>,
        wake: Arc<Notify>,
        line: watch::Sender<Arc<CompositeLine>>,
        bus: Bus,
    ) -> Self {
        let outputs = vec![Output::empty(); slots.len()];
        Self {
            names,
            slots,
            outputs,
            wake,
            line,
            bus,
        }
    }

    /// Runs until `token` is cancelled (`Ok`) or the renderer fails (`Err`).
    pub async fn run(
        mut self,
        renderer: &mut dyn Render,
        token: CancellationToken,
    ) -> Result<(), RenderError> {
        let mut last: Option<Arc<CompositeLine>> = None;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(()),
                _ = self.wake.notified() => {}
            }
            if !self.collect() {
                continue;
            }

            let line = Arc::new(CompositeLine::compose(
                self.names.iter().zip(self.outputs.iter()),
            ));
            if last.as_deref() == Some(&*line) {
                self.line.send_replace(line);
                continue;
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(()),
                res = renderer.render(&line) => res?,
            }
            self.bus
                .publish(Event::new(EventKind::LineRendered).with_segments(line.len()));
            self.line.send_replace(Arc::clone(&line));
            last = Some(line);
        }
    }

    /// Copies changed slots into the local outputs; returns whether any changed.
    fn collect(&mut self) -> bool {
        let mut changed = false;
        for (slot, output) in self.slots.iter_mut().zip(self.outputs.iter_mut()) {
            if slot.has_changed().unwrap_or(false) {
                *output = slot.borrow_and_update().clone();
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slot::slot;
    use crate::output::Segment;
    use crate::render::testing::Recorder;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn renders_changes_once_and_keeps_order() {
        let wake = Arc::new(Notify::new());
        let (a, rx_a) = slot(&wake);
        let (b, rx_b) = slot(&wake);
        let (line_tx, line_rx) = watch::channel(Arc::new(CompositeLine::default()));
        let composer = Composer::new(
            vec![Arc::from("a"), Arc::from("b")],
            vec![rx_a, rx_b],
            Arc::clone(&wake),
            line_tx,
            Bus::new(16),
        );

        let rec = Recorder::new();
        let mut renderer = rec.clone();
        let token = CancellationToken::new();
        let stop = token.clone();
        let run = tokio::spawn(async move { composer.run(&mut renderer, stop).await });

        b.emit(Output::one(Segment::new("B")));
        tokio::time::sleep(Duration::from_millis(10)).await;
        a.emit(Output::one(Segment::new("A")));
        tokio::time::sleep(Duration::from_millis(10)).await;
        a.emit(Output::one(Segment::new("A")));
        tokio::time::sleep(Duration::from_millis(10)).await;

        token.cancel();
        run.await.unwrap().unwrap();
        assert_eq!(rec.lines(), vec![vec!["B"], vec!["A", "B"]]);
        assert_eq!(line_rx.borrow().texts(), vec!["A", "B"]);
    }

    struct Slow(Recorder);

    #[async_trait::async_trait]
    impl Render for Slow {
        async fn render(&mut self, line: &CompositeLine) -> Result<(), RenderError> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            self.0.render(line).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn router_keeps_old_line_while_render_is_in_flight() {
        let wake = Arc::new(Notify::new());
        let (a, rx_a) = slot(&wake);
        let (line_tx, line_rx) = watch::channel(Arc::new(CompositeLine::default()));
        let composer = Composer::new(
            vec![Arc::from("a")],
            vec![rx_a],
            Arc::clone(&wake),
            line_tx,
            Bus::new(16),
        );

        let rec = Recorder::new();
        let mut renderer = Slow(rec.clone());
        let token = CancellationToken::new();
        let stop = token.clone();
        let run = tokio::spawn(async move { composer.run(&mut renderer, stop).await });

        a.emit(Output::one(Segment::new("W: down")));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(line_rx.borrow().texts().is_empty());
        assert!(rec.lines().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(line_rx.borrow().texts(), vec!["W: down"]);
        assert_eq!(rec.lines(), vec![vec!["W: down"]]);

        token.cancel();
        run.await.unwrap().unwrap();
    }
}
