//! # Bar: module actors, composer, click routing and graceful shutdown.
//!
//! The [`Bar`] owns the ordered module list, the renderer, the event bus and
//! the subscriber set. [`Bar::run`] spawns one actor per module, drives the
//! composer and handles shutdown.
//!
//! ## High-level architecture
//! ```text
//! Bar::add(ModuleSpec) × N                 (registration order = render order)
//!
//! Bar::run() / Bar::run_until(stop):
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit + AliveTracker
//!   - per module: slot (watch) + ModuleActor on child token, in a JoinSet
//!   - Composer::run(renderer)  ─► line ─► ClickRouter (watch)
//!
//! Termination:
//!   stop future / OS signal ──┐
//!   renderer error ───────────┴─► Bus.publish(ShutdownRequested)
//!                                  └─► runtime_token.cancel()
//!                                  └─► wait_all_with_grace(cfg.grace):
//!                                        ├─ Ok       → AllStoppedWithin
//!                                        └─ elapsed  → GraceExceeded (AliveTracker.snapshot())
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use barvisor::{Bar, BarConfig, ModuleSpec, Output, Segment, render::Discard};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), barvisor::RuntimeError> {
//!     let mut bar = Bar::builder(BarConfig::default()).renderer(Discard).build();
//!     bar.add(
//!         ModuleSpec::builder("hello")
//!             .every(Duration::from_secs(1))
//!             .build(|_ctx| async { Ok(Output::one(Segment::new("hello"))) }),
//!     );
//!     bar.run_until(tokio::time::sleep(Duration::from_millis(10))).await
//! }
//! ```

use std::future::{Future, pending};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use super::actor::{ModuleActor, ModuleActorParams};
use super::alive::AliveTracker;
use super::builder::BarBuilder;
use super::composer::Composer;
use super::registry::{ActionTarget, Registry};
use super::router::ClickRouter;
use super::shutdown;
use super::slot::slot;
use crate::config::BarConfig;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::module::{ModuleRef, ModuleSpec, Refresh, Schedule};
use crate::output::CompositeLine;
use crate::render::Render;
use crate::subscribers::{Subscribe, SubscriberSet};

/// A registered module waiting for [`Bar::run`].
struct Registered {
    module: ModuleRef,
    name: Arc<str>,
    schedule: Schedule,
    timeout: Option<Duration>,
    refresh: Refresh,
}

/// Coordinates module actors, the composer and graceful shutdown.
pub struct Bar {
    cfg: BarConfig,
    bus: Bus,
    renderer: Box<dyn Render>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    modules: Vec<Registered>,
    registry: Arc<Registry>,
    line: watch::Sender<Arc<CompositeLine>>,
    alive: Arc<AliveTracker>,
}

impl Bar {
    /// Creates a builder for the bar.
    pub fn builder(cfg: BarConfig) -> BarBuilder {
        BarBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: BarConfig,
        renderer: Box<dyn Render>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (line, _) = watch::channel(Arc::new(CompositeLine::default()));
        Self {
            cfg,
            bus,
            renderer,
            subscribers,
            modules: Vec::new(),
            registry: Arc::new(Registry::default()),
            line,
            alive: Arc::new(AliveTracker::new()),
        }
    }

    pub fn config(&self) -> &BarConfig {
        &self.cfg
    }

    /// Registers a module and returns its index (its position in the line order).
    pub fn add(&mut self, spec: ModuleSpec) -> usize {
        let (module, schedule, timeout, admission) = spec.into_parts();
        let name: Arc<str> = Arc::from(module.name());
        let refresh = Refresh::new();
        let index = self.registry.register(ActionTarget::new(
            Arc::clone(&name),
            refresh.clone(),
            admission,
        ));
        self.modules.push(Registered {
            module,
            name,
            schedule,
            timeout,
            refresh,
        });
        index
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns a click router bound to this bar.
    ///
    /// The router stays valid after `run` consumed the bar.
    pub fn router(&self) -> ClickRouter {
        ClickRouter::new(
            self.line.subscribe(),
            Arc::clone(&self.registry),
            self.bus.clone(),
        )
    }

    /// Receiver of all runtime events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs until an OS termination signal arrives, then shuts down gracefully.
    pub async fn run(self) -> Result<(), RuntimeError> {
        self.drive(async {
            match shutdown::wait_for_signal().await {
                Ok(signal) => signal,
                Err(err) => {
                    warn!(error = %err, "cannot listen for termination signals");
                    pending().await
                }
            }
        })
        .await
    }

    /// Runs until `stop` completes, then shuts down gracefully.
    pub async fn run_until<F>(self, stop: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send,
    {
        self.drive(async {
            stop.await;
            "stop requested"
        })
        .await
    }

    async fn drive<F>(self, stop: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = &'static str> + Send,
    {
        let Bar {
            cfg,
            bus,
            mut renderer,
            subscribers,
            modules,
            registry: _,
            line,
            alive,
        } = self;

        let listener_stop = CancellationToken::new();
        let listener = subscriber_listener(
            &bus,
            SubscriberSet::new(subscribers, bus.clone()),
            Arc::clone(&alive),
            listener_stop.clone(),
        );

        let token = CancellationToken::new();
        let wake = Arc::new(Notify::new());
        let mut set = JoinSet::new();
        let mut names = Vec::with_capacity(modules.len());
        let mut slots = Vec::with_capacity(modules.len());
        for m in modules {
            let (writer, rx) = slot(&wake);
            let actor = ModuleActor::new(
                m.module,
                Arc::clone(&m.name),
                ModuleActorParams {
                    schedule: m.schedule,
                    timeout: m.timeout,
                    refresh: m.refresh,
                },
                writer,
                bus.clone(),
            );
            set.spawn(actor.run(token.child_token()));
            names.push(m.name);
            slots.push(rx);
        }

        let composer = Composer::new(names, slots, wake, line, bus.clone());
        let compose = composer.run(renderer.as_mut(), token.clone());
        tokio::pin!(compose);
        tokio::pin!(stop);

        let render_err = tokio::select! {
            reason = &mut stop => {
                bus.publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));
                None
            }
            res = &mut compose => match res {
                Ok(()) => None,
                Err(e) => {
                    error!(error = %e, label = e.as_label(), "renderer failed");
                    bus.publish(
                        Event::new(EventKind::ShutdownRequested).with_reason("renderer failed"),
                    );
                    Some(e)
                }
            },
        };
        token.cancel();

        let res = wait_all_with_grace(&mut set, cfg.grace, &bus, &alive).await;

        listener_stop.cancel();
        if tokio::time::timeout(cfg.grace, listener).await.is_err() {
            warn!("subscribers did not drain within grace");
        }

        match render_err {
            Some(e) => Err(RuntimeError::Render(e)),
            None => res,
        }
    }
}

/// Forwards bus events to the subscriber set and the alive tracker.
///
/// After `stop` is cancelled the listener drains what is already queued,
/// then waits for the subscriber workers to finish.
fn subscriber_listener(
    bus: &Bus,
    set: SubscriberSet,
    alive: Arc<AliveTracker>,
    stop: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => {
                        alive.update(&ev).await;
                        set.emit(&ev);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}

/// Waits for all actors to finish within `grace`.
///
/// Publishes [`EventKind::AllStoppedWithin`] on success, or
/// [`EventKind::GraceExceeded`] and returns [`RuntimeError::GraceExceeded`]
/// with the modules still inside a tick.
async fn wait_all_with_grace(
    set: &mut JoinSet<()>,
    grace: Duration,
    bus: &Bus,
    alive: &AliveTracker,
) -> Result<(), RuntimeError> {
    let done = async {
        while let Some(res) = set.join_next().await {
            if let Err(err) = res {
                if err.is_panic() {
                    error!(error = %err, "module actor panicked");
                }
            }
        }
    };
    match tokio::time::timeout(grace, done).await {
        Ok(()) => {
            bus.publish(Event::new(EventKind::AllStoppedWithin));
            Ok(())
        }
        Err(_) => {
            set.abort_all();
            let stuck = alive.snapshot().await;
            bus.publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")));
            Err(RuntimeError::GraceExceeded { grace, stuck })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::TickContext;
    use crate::output::{Button, Click, ClickEvent, Output, Segment};
    use crate::render::testing::Recorder;

    fn bar_with(rec: &Recorder) -> Bar {
        Bar::builder(BarConfig::default())
            .renderer(rec.clone())
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn manual_module_first_then_interval_module() {
        let rec = Recorder::new();
        let mut bar = bar_with(&rec);
        let b = bar.add(
            ModuleSpec::builder("B").build(|_ctx| async { Ok(Output::one(Segment::new("Y"))) }),
        );
        let a = bar.add(ModuleSpec::builder("A").every(Duration::from_secs(1)).build(
            |ctx: TickContext| async move {
                if ctx.tick == 1 {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Ok(Output::one(Segment::new("X")))
            },
        ));
        assert_eq!((b, a), (0, 1));

        bar.run_until(tokio::time::sleep(Duration::from_millis(5500)))
            .await
            .unwrap();
        assert_eq!(rec.lines(), vec![vec!["Y"], vec!["Y", "X"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_module_is_hidden_and_keeps_ticking() {
        let rec = Recorder::new();
        let mut bar = bar_with(&rec);
        bar.add(
            ModuleSpec::builder("q").build(|_ctx| async { Ok(Output::one(Segment::new("q"))) }),
        );
        bar.add(ModuleSpec::builder("p").every(Duration::from_secs(1)).build(
            |ctx: TickContext| async move {
                if ctx.tick == 2 {
                    panic!("tick 2 exploded");
                }
                Ok(Output::one(Segment::new(format!("p{}", ctx.tick))))
            },
        ));
        let mut events = bar.subscribe();

        bar.run_until(tokio::time::sleep(Duration::from_millis(4500)))
            .await
            .unwrap();

        let lines = rec.lines();
        let first = lines.iter().position(|l| l == &vec!["q", "p1"]).unwrap();
        assert_eq!(lines[first + 1], vec!["q"]);
        assert!(lines.iter().any(|l| l == &vec!["q", "p3"]));
        assert!(lines.iter().any(|l| l == &vec!["q", "p4"]));

        let failed: Vec<Option<u64>> = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::TickFailed)
            .map(|ev| ev.tick)
            .collect();
        assert_eq!(failed, vec![Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn renderer_failure_stops_the_bar_once() {
        let rec = Recorder::failing_after(1);
        let mut bar = bar_with(&rec);
        bar.add(ModuleSpec::builder("n").every(Duration::from_secs(1)).build(
            |ctx: TickContext| async move { Ok(Output::one(Segment::new(ctx.tick.to_string()))) },
        ));
        let mut events = bar.subscribe();

        let err = bar.run_until(std::future::pending::<()>()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Render(_)));
        assert_eq!(rec.lines(), vec![vec!["1"]]);

        let mut shutdown = Vec::new();
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::ShutdownRequested {
                shutdown.push(ev.reason.as_deref().map(String::from));
            }
        }
        assert_eq!(shutdown, vec![Some("renderer failed".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_stop_reports_all_stopped() {
        let mut bar = bar_with(&Recorder::new());
        bar.add(ModuleSpec::builder("idle").build(|_ctx| async { Ok(Output::empty()) }));
        let mut events = bar.subscribe();

        bar.run_until(tokio::time::sleep(Duration::from_millis(10)))
            .await
            .unwrap();

        let kinds: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        let requested = kinds
            .iter()
            .position(|k| *k == EventKind::ShutdownRequested)
            .unwrap();
        let stopped = kinds
            .iter()
            .position(|k| *k == EventKind::AllStoppedWithin)
            .unwrap();
        assert!(requested < stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_action_does_not_delay_renders() {
        let rec = Recorder::new();
        let mut bar = bar_with(&rec);
        bar.add(ModuleSpec::builder("w").build(|_ctx| async {
            let click = Click::left(|_ctx| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            });
            Ok(Output::one(Segment::new("w").with_click(click)))
        }));
        bar.add(ModuleSpec::builder("n").every(Duration::from_secs(1)).build(
            |ctx: TickContext| async move { Ok(Output::one(Segment::new(ctx.tick.to_string()))) },
        ));

        let router = bar.router();
        let clicker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            router.dispatch(ClickEvent::at(0, Button::Left))
        });
        bar.run_until(tokio::time::sleep(Duration::from_millis(3500)))
            .await
            .unwrap();

        assert!(clicker.await.unwrap().is_running());
        assert_eq!(rec.lines().last().unwrap(), &vec!["w", "4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_tick_events() {
        use crate::subscribers::Subscribe;
        use async_trait::async_trait;
        use std::sync::Mutex;

        #[derive(Default)]
        struct Kinds(Mutex<Vec<EventKind>>);

        #[async_trait]
        impl Subscribe for Kinds {
            async fn on_event(&self, ev: &Event) {
                self.0.lock().unwrap().push(ev.kind);
            }
        }

        let kinds = Arc::new(Kinds::default());
        let mut bar = Bar::builder(BarConfig::default())
            .subscribers(vec![kinds.clone() as Arc<dyn Subscribe>])
            .build();
        bar.add(ModuleSpec::builder("one").build(|_ctx| async {
            Ok(Output::one(Segment::new("1")))
        }));
        bar.run_until(tokio::time::sleep(Duration::from_millis(10)))
            .await
            .unwrap();

        let seen = kinds.0.lock().unwrap().clone();
        assert!(seen.contains(&EventKind::TickStarting));
        assert!(seen.contains(&EventKind::TickFinished));
        assert!(seen.contains(&EventKind::LineRendered));
        assert!(seen.contains(&EventKind::AllStoppedWithin));
    }
}
