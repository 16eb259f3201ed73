//! # Per-module output slots.
//!
//! Each module owns exactly one slot: a `watch` channel holding its last
//! emitted [`Output`]. The module actor is the only writer; the composer is
//! the only reader. All slots share one [`Notify`] so the composer sleeps
//! until *any* module emitted.
//!
//! ```text
//! Actor A ── SlotWriter::emit ──► watch A ──┐
//! Actor B ── SlotWriter::emit ──► watch B ──┼──► Composer (scans has_changed)
//!               └────── wake.notify_one() ──┘
//! ```
//!
//! ## Rules
//! - Emitting never blocks and never waits for the composer.
//! - Wake-ups coalesce: many emits before the composer runs cause one scan.
//! - A slot starts with an empty output and counts as unchanged until the
//!   first emit.

use std::sync::Arc;

use tokio::sync::{Notify, watch};

use crate::output::Output;

/// Write half of a module slot, owned by the module actor.
pub(crate) struct SlotWriter {
    tx: watch::Sender<Output>,
    wake: Arc<Notify>,
}

impl SlotWriter {
    /// Replaces the slot content and wakes the composer.
    pub fn emit(&self, output: Output) {
        self.tx.send_replace(output);
        self.wake.notify_one();
    }
}

/// Creates a slot sharing `wake` with all other slots of the bar.
pub(crate) fn slot(wake: &Arc<Notify>) -> (SlotWriter, watch::Receiver<Output>) {
    let (tx, rx) = watch::channel(Output::empty());
    let writer = SlotWriter {
        tx,
        wake: Arc::clone(wake),
    };
    (writer, rx)
}
