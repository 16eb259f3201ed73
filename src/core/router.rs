//! # ClickRouter: clicks → segment handlers.
//!
//! The router resolves a [`ClickEvent`] against the last composite line the
//! composer published and runs the bound action on its own task.
//!
//! ```text
//! dispatch(event)                                   (sync, never awaits)
//!   ├─► resolve target in last line ── none ──► NoSegment  (ClickUnresolved)
//!   ├─► segment.click.action_for(button) ─ none ─► Unbound (ClickUnhandled)
//!   └─► admission:
//!         DropIfRunning ─► gate.try_lock_owned() ─ taken ─► Busy (ActionDropped)
//!                                   └─ free ─► spawn(action) ─► Running(handle)
//!         Queue ─────────► spawn(gate.lock_owned().await; action) ─► Running(handle)
//! ```
//!
//! ## Rules
//! - Actions of one module never overlap; actions of different modules never
//!   wait for each other.
//! - Actions never delay ticks or renders: they run on separate tasks and
//!   ask for a fresh tick through `ClickContext::refresh` when done.
//! - Action errors are logged and published as `ActionFailed`; they are
//!   not shown on the bar.

use std::sync::Arc;

use tokio::sync::{OwnedMutexGuard, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::admission::ActionAdmission;
use super::registry::{ActionTarget, Registry};
use crate::events::{Bus, Event, EventKind};
use crate::output::{ActionRef, Button, ClickContext, ClickEvent, CompositeLine};

/// Outcome of [`ClickRouter::dispatch`].
#[derive(Debug)]
pub enum Dispatched {
    /// The action runs on the returned task.
    Running(JoinHandle<()>),
    /// The segment has no binding for the button.
    Unbound,
    /// The target does not exist in the current line.
    NoSegment,
    /// Another action of the same module is running (`DropIfRunning`).
    Busy,
}

impl Dispatched {
    pub fn is_running(&self) -> bool {
        matches!(self, Dispatched::Running(_))
    }
}

/// Cloneable click dispatcher of one bar.
#[derive(Clone)]
pub struct ClickRouter {
    line: watch::Receiver<Arc<CompositeLine>>,
    registry: Arc<Registry>,
    bus: Bus,
}

impl ClickRouter {
    pub(crate) fn new(
        line: watch::Receiver<Arc<CompositeLine>>,
        registry: Arc<Registry>,
        bus: Bus,
    ) -> Self {
        Self {
            line,
            registry,
            bus,
        }
    }

    /// Snapshot of the last composite line published by the bar.
    pub fn current_line(&self) -> Arc<CompositeLine> {
        Arc::clone(&self.line.borrow())
    }

    /// Routes one click. Must be called from within a Tokio runtime.
    pub fn dispatch(&self, event: ClickEvent) -> Dispatched {
        let line = self.current_line();
        let Some(entry) = line.resolve(&event.target) else {
            debug!(segment = ?event.target, button = ?event.button, "click outside of any segment");
            self.bus.publish(
                Event::new(EventKind::ClickUnresolved)
                    .with_button(event.button)
                    .with_reason(format!("{:?}", event.target)),
            );
            return Dispatched::NoSegment;
        };

        let action = entry
            .segment
            .click()
            .and_then(|c| c.action_for(event.button))
            .cloned();
        let Some(action) = action else {
            info!(module = %entry.name, button = ?event.button, "button not handled");
            self.bus.publish(
                Event::new(EventKind::ClickUnhandled)
                    .with_module(Arc::clone(&entry.name))
                    .with_button(event.button),
            );
            return Dispatched::Unbound;
        };

        let Some(target) = self.registry.get(entry.module) else {
            warn!(module = %entry.name, "clicked module is not registered");
            return Dispatched::NoSegment;
        };
        let bus = self.bus.clone();
        let button = event.button;

        match target.admission {
            ActionAdmission::DropIfRunning => match Arc::clone(&target.gate).try_lock_owned() {
                Ok(permit) => Dispatched::Running(tokio::spawn(run_action(
                    permit, target, action, button, bus,
                ))),
                Err(_) => {
                    info!(module = %target.name, button = ?button, "action already running; click dropped");
                    self.bus.publish(
                        Event::new(EventKind::ActionDropped)
                            .with_module(Arc::clone(&target.name))
                            .with_button(button),
                    );
                    Dispatched::Busy
                }
            },
            ActionAdmission::Queue => Dispatched::Running(tokio::spawn(async move {
                let permit = Arc::clone(&target.gate).lock_owned().await;
                run_action(permit, target, action, button, bus).await;
            })),
        }
    }
}

/// Runs one action while holding the module's gate.
async fn run_action(
    _permit: OwnedMutexGuard<()>,
    target: Arc<ActionTarget>,
    action: ActionRef,
    button: Button,
    bus: Bus,
) {
    bus.publish(
        Event::new(EventKind::ActionStarted)
            .with_module(Arc::clone(&target.name))
            .with_button(button),
    );
    let ctx = ClickContext {
        button,
        refresh: target.refresh.clone(),
    };
    let ev = match action(ctx).await {
        Ok(()) => Event::new(EventKind::ActionFinished),
        Err(e) => {
            warn!(module = %target.name, button = ?button, error = %e, "action failed");
            Event::new(EventKind::ActionFailed).with_reason(e.to_string())
        }
    };
    bus.publish(ev.with_module(Arc::clone(&target.name)).with_button(button));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::module::Refresh;
    use crate::output::{Click, Output, SegmentRef, Segment};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Fixture {
        router: ClickRouter,
        line_tx: watch::Sender<Arc<CompositeLine>>,
        refresh: Refresh,
        bus: Bus,
    }

    fn fixture(admission: ActionAdmission, outputs: Vec<Output>) -> Fixture {
        let registry = Arc::new(Registry::default());
        let refresh = Refresh::new();
        let names: Vec<Arc<str>> = (0..outputs.len())
            .map(|i| Arc::from(format!("m{i}")))
            .collect();
        for name in &names {
            registry.register(ActionTarget::new(
                Arc::clone(name),
                refresh.clone(),
                admission,
            ));
        }
        let line = CompositeLine::compose(names.iter().zip(outputs.iter()));
        let (line_tx, line_rx) = watch::channel(Arc::new(line));
        let bus = Bus::new(64);
        Fixture {
            router: ClickRouter::new(line_rx, registry, bus.clone()),
            line_tx,
            refresh,
            bus,
        }
    }

    /// Segment whose left click sleeps `ms` while tracking concurrency.
    fn tracked(running: Arc<AtomicUsize>, peak: Arc<AtomicUsize>, ms: u64) -> Segment {
        Segment::new("x").with_click(Click::left(move |_ctx| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        }))
    }

    #[tokio::test]
    async fn unresolved_and_unbound_clicks_are_no_ops() {
        let seg = Segment::new("w").with_click(Click::left(|_ctx| async { Ok(()) }));
        let f = fixture(ActionAdmission::default(), vec![Output::one(seg)]);
        let mut rx = f.bus.subscribe();

        assert!(matches!(
            f.router.dispatch(ClickEvent::at(5, Button::Left)),
            Dispatched::NoSegment
        ));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ClickUnresolved);

        assert!(matches!(
            f.router.dispatch(ClickEvent::at(0, Button::Middle)),
            Dispatched::Unbound
        ));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ClickUnhandled);
        assert_eq!(ev.module.as_deref(), Some("m0"));
        assert_eq!(ev.button, Some(Button::Middle));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_if_running_rejects_overlapping_clicks() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let f = fixture(
            ActionAdmission::DropIfRunning,
            vec![Output::one(tracked(running.clone(), peak.clone(), 100))],
        );

        let Dispatched::Running(first) = f.router.dispatch(ClickEvent::at(0, Button::Left)) else {
            panic!("first click must run");
        };
        assert!(matches!(
            f.router.dispatch(ClickEvent::at(0, Button::Left)),
            Dispatched::Busy
        ));
        first.await.unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 1);

        let Dispatched::Running(again) = f.router.dispatch(ClickEvent::at(0, Button::Left)) else {
            panic!("gate must be free again");
        };
        again.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn queue_runs_clicks_one_after_another() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let f = fixture(
            ActionAdmission::Queue,
            vec![Output::one(tracked(running.clone(), peak.clone(), 100))],
        );

        let start = tokio::time::Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| match f.router.dispatch(ClickEvent::at(0, Button::Left)) {
                Dispatched::Running(h) => h,
                other => panic!("expected Running, got {other:?}"),
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn different_modules_do_not_wait_for_each_other() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let f = fixture(
            ActionAdmission::DropIfRunning,
            vec![
                Output::one(tracked(running.clone(), peak.clone(), 100)),
                Output::one(tracked(running.clone(), peak.clone(), 100)),
            ],
        );

        let a = f.router.dispatch(ClickEvent::at(0, Button::Left));
        let b = f.router.dispatch(ClickEvent::at(1, Button::Left));
        let (Dispatched::Running(a), Dispatched::Running(b)) = (a, b) else {
            panic!("both clicks must run");
        };
        a.await.unwrap();
        b.await.unwrap();
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_action_is_reported_and_refresh_reaches_the_module() {
        let seg = Segment::new("lp").with_click(Click::any(|ctx: ClickContext| async move {
            ctx.refresh.now();
            Err(ModuleError::fail(format!("{:?} failed", ctx.button)))
        }));
        let f = fixture(ActionAdmission::default(), vec![Output::one(seg)]);
        let mut rx = f.bus.subscribe();

        let Dispatched::Running(h) = f.router.dispatch(ClickEvent {
            button: Button::Right,
            target: SegmentRef::Module {
                module: 0,
                segment: 0,
            },
        }) else {
            panic!("catch-all binding must run");
        };
        h.await.unwrap();

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ActionStarted);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::ActionFailed);
        assert!(failed.reason.as_deref().unwrap().contains("Right failed"));
        tokio::time::timeout(Duration::from_secs(1), f.refresh.requested())
            .await
            .expect("action asked for a refresh");
    }

    #[tokio::test]
    async fn dispatch_uses_the_latest_published_line() {
        let f = fixture(ActionAdmission::default(), vec![Output::empty()]);
        assert!(matches!(
            f.router.dispatch(ClickEvent::at(0, Button::Left)),
            Dispatched::NoSegment
        ));

        let name: Arc<str> = Arc::from("m0");
        let out = Output::one(Segment::new("up").with_click(Click::left(|_ctx| async { Ok(()) })));
        f.line_tx
            .send_replace(Arc::new(CompositeLine::compose([(&name, &out)])));
        assert!(f.router.dispatch(ClickEvent::at(0, Button::Left)).is_running());
    }
}
