//! # Per-module click action admission
//!
//! Click actions of one module share a **gate**: at any given time at most
//! one action of a module runs. When a click arrives while the gate is taken,
//! the module's admission policy decides what happens to it.
//!
//! ## Variants
//! - `DropIfRunning`: if an action of the module is running, **ignore** the new click.
//! - `Queue`: **wait** for the running action, then run (FIFO).
//!
//! ## Invariants
//! - Actions of the same module never run in parallel.
//! - Actions of different modules never wait for each other.
//! - Queued clicks run in arrival order (tokio mutex fairness).

/// Policy controlling clicks that arrive while an action of the same module runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionAdmission {
    /// Skip the click if an action is already running.
    ///
    /// Use when the action restarts or toggles something and a second
    /// click would only fight the first one (wifi restart, login prompt).
    #[default]
    DropIfRunning,

    /// Run the click after the running action finished.
    ///
    /// Use when every click matters (volume steps, workspace cycling).
    Queue,
}
