//! # Tracker of modules currently inside a tick.
//!
//! Maintains which modules are running a tick, using event sequence numbers
//! to handle out-of-order delivery. The bar reads a snapshot when shutdown
//! exceeds its grace period, to name the stuck modules.
//!
//! ```text
//! Actor ──► Bus ──► subscriber_listener() ──► AliveTracker::update()
//!                                                     │
//!                                                     ▼
//!                                       HashMap<String, ModuleState>
//!                                          (name → {seq, in_tick})
//! ```
//!
//! ## Rules
//! - `TickStarting` marks a module in-tick; `TickFinished` / `TickFailed` /
//!   `TickCanceled` clear it
//! - Events with `seq <= last_seq` are **rejected** (stale)

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};

#[derive(Debug, Clone)]
struct ModuleState {
    last_seq: Option<u64>,
    in_tick: bool,
}

/// Thread-safe tracker of modules inside a tick.
#[derive(Default)]
pub struct AliveTracker {
    state: RwLock<HashMap<String, ModuleState>>,
}

impl AliveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `ev` if it is newer than the last event seen for its module.
    ///
    /// Returns `true` when the in-tick state changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let in_tick = match ev.kind {
            EventKind::TickStarting => true,
            EventKind::TickFinished | EventKind::TickFailed | EventKind::TickCanceled => false,
            _ => return false,
        };
        let Some(name) = ev.module.as_deref() else {
            return false;
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(ModuleState {
            last_seq: None,
            in_tick: false,
        });
        if entry.last_seq.is_some_and(|last| ev.seq <= last) {
            return false;
        }
        entry.last_seq = Some(ev.seq);
        let changed = entry.in_tick != in_tick;
        entry.in_tick = in_tick;
        changed
    }

    /// Sorted names of modules currently inside a tick.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, s)| s.in_tick)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }
}
