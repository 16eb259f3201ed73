//! # barvisor
//!
//! **Barvisor** runs a status bar: several independent, differently timed
//! modules produce display segments concurrently, their latest outputs are
//! merged into one ordered line on every change, and clicks are routed back
//! to the module that owns the clicked segment.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  ModuleSpec  │   │  ModuleSpec  │   │  ModuleSpec  │
//!     │  (battery)   │   │   (wifi)     │   │   (clock)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bar (runtime)                                                    │
//! │  - Bus (broadcast events)                                         │
//! │  - AliveTracker (modules inside a tick)                           │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - Registry (click targets by module index)                       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ModuleActor  │   │ ModuleActor  │   │ ModuleActor  │
//!     │ (tick loop)  │   │ (tick loop)  │   │ (tick loop)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ watch slot       │ watch slot       │ watch slot
//!            └──────────────────┼──────────────────┘
//!                               ▼  (shared Notify)
//!                     ┌───────────────────┐
//!                     │     Composer      │── changed? ──► Render (i3bar)
//!                     └─────────┬─────────┘
//!                               ▼ watch<CompositeLine>
//!                     ┌───────────────────┐
//!   click (stdin) ──► │    ClickRouter    │──► action task (per-module gate)
//!                     └───────────────────┘
//! ```
//!
//! ### Module lifecycle
//! ```text
//! ModuleSpec ──► Bar::add ──► ModuleActor::run()
//!
//! loop {
//!   ├─► publish TickStarting
//!   ├─► run_tick(module, timeout)
//!   │       ├─ Ok(output)  ─► TickFinished, slot.emit(output)
//!   │       ├─ Err(fail)   ─► TickFailed,   slot.emit(empty)
//!   │       └─ Err(timeout)─► TimeoutHit + TickFailed, slot.emit(empty)
//!   └─► wait for: schedule | push trigger | refresh request | shutdown
//! }
//! ```
//!
//! ## Features
//! | Area               | Description                                              | Key types / traits                         |
//! |--------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Modules**        | Named producers of segments, closures or structs.        | [`Module`], [`ModuleFn`], [`ModuleSpec`]   |
//! | **Scheduling**     | Intervals, wall-clock alignment, push triggers, refresh. | [`Schedule`], [`Trigger`], [`Refresh`]     |
//! | **Output**         | Segments, colors, click bindings, the composite line.    | [`Segment`], [`Output`], [`CompositeLine`] |
//! | **Clicks**         | Resolution and per-module action serialization.          | [`ClickRouter`], [`ActionAdmission`]       |
//! | **Rendering**      | Renderer boundary and the i3bar protocol.                | [`Render`], [`I3bar`]                      |
//! | **Subscriber API** | Hook into runtime events (logging, custom subscribers).  | [`Subscribe`], [`LogWriter`]               |
//! | **Blocks**         | Battery, disk, wifi, ethernet, clock, LastPass.          | [`blocks`], [`sources`]                    |
//! | **Errors**         | Typed errors for the runtime, modules and renderers.     | [`RuntimeError`], [`ModuleError`]          |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use barvisor::{Bar, BarConfig, ModuleSpec, Output, Segment};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = BarConfig::default();
//!     let mut bar = Bar::builder(cfg).build();
//!
//!     bar.add(
//!         ModuleSpec::builder("hello")
//!             .every(Duration::from_secs(1))
//!             .build(|ctx| async move {
//!                 Ok(Output::one(Segment::new(format!("tick {}", ctx.tick))))
//!             }),
//!     );
//!
//!     bar.run_until(tokio::time::sleep(Duration::from_millis(50))).await?;
//!     Ok(())
//! }
//! ```

pub mod blocks;
pub mod command;
mod config;
mod core;
mod error;
mod events;
mod module;
mod output;
pub mod render;
pub mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use config::{BarConfig, Palette};
pub use core::{ActionAdmission, Bar, BarBuilder, ClickRouter, Dispatched};
pub use error::{ModuleError, RenderError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use module::{
    Module, ModuleFn, ModuleRef, ModuleSpec, ModuleSpecBuilder, Refresh, Schedule, TickContext,
    Trigger,
};
pub use output::{
    ActionFuture, ActionRef, Button, Click, ClickContext, ClickEvent, Color, CompositeLine,
    LineEntry, Output, Segment, SegmentRef,
};
pub use render::{Discard, I3bar, Render};
pub use subscribers::{LogWriter, SubscriberSet, Subscribe};
