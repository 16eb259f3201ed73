//! # When modules tick.
//!
//! A [`Schedule`] combines up to two ticking sources:
//!
//! - a **periodic timer**: fixed interval, optionally aligned to wall-clock
//!   multiples of the period (a clock wants to tick at `hh:mm:ss.000`);
//! - a **push trigger**: a stream that yields whenever the underlying OS
//!   state changed (netlink monitor, udev events, ...).
//!
//! On top of that every module can be refreshed on demand through its
//! [`Refresh`](super::Refresh) handle, and always ticks once at start.
//!
//! ```text
//! Schedule::every(1s)                 tick, 1s, tick, 1s, tick ...
//! Schedule::aligned(1s)               tick, [next .000], tick, 1s, tick ...
//! Schedule::push(trigger)             tick, [trigger item], tick ...
//! Schedule::push(t).and_every(30s)    whichever comes first
//! Schedule::manual()                  tick, then refresh requests only
//! ```
//!
//! ## Rules
//! - Missed periodic ticks are delayed, never bursted (aligned timers skip).
//! - A trigger stream that ends is dropped; the periodic timer (if any) keeps going.

use std::fmt;
use std::future::pending;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Push trigger: every item requests a tick.
pub type Trigger = BoxStream<'static, ()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Period {
    Every(Duration),
    Aligned(Duration),
}

/// Ticking sources of one module.
#[derive(Default)]
pub struct Schedule {
    period: Option<Period>,
    trigger: Option<Trigger>,
}

impl Schedule {
    /// First tick plus refresh requests only.
    pub fn manual() -> Self {
        Self::default()
    }

    /// Re-run every `period`.
    pub fn every(period: Duration) -> Self {
        Self::manual().and_every(period)
    }

    /// Re-run every `period`, aligned to wall-clock multiples of `period`.
    pub fn aligned(period: Duration) -> Self {
        Self {
            period: Some(Period::Aligned(period)),
            trigger: None,
        }
    }

    /// Re-run whenever `trigger` yields.
    pub fn push<S>(trigger: S) -> Self
    where
        S: Stream<Item = ()> + Send + 'static,
    {
        Self {
            period: None,
            trigger: Some(trigger.boxed()),
        }
    }

    /// Adds a fixed interval (replaces any previous one).
    pub fn and_every(mut self, period: Duration) -> Self {
        self.period = Some(Period::Every(period));
        self
    }

    /// Returns the configured period, if any.
    pub fn period(&self) -> Option<Duration> {
        self.period.map(|p| match p {
            Period::Every(d) | Period::Aligned(d) => d,
        })
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    /// Arms the timers. Must be called from within a Tokio runtime.
    pub(crate) fn into_ticker(self) -> Ticker {
        let interval = self.period.and_then(|p| match p {
            Period::Every(d) if d > Duration::ZERO => {
                let mut i = interval_at(Instant::now() + d, d);
                i.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Some(i)
            }
            Period::Aligned(d) if d > Duration::ZERO => {
                let mut i = interval_at(Instant::now() + until_boundary(SystemTime::now(), d), d);
                i.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Some(i)
            }
            _ => None,
        });
        Ticker {
            interval,
            trigger: self.trigger,
        }
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("period", &self.period)
            .field("trigger", &self.trigger.is_some())
            .finish()
    }
}

/// Time left until the next wall-clock multiple of `period`.
fn until_boundary(now: SystemTime, period: Duration) -> Duration {
    let period_ns = period.as_nanos();
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let rem = since_epoch % period_ns;
    let wait = if rem == 0 { period_ns } else { period_ns - rem };
    Duration::from_nanos(u64::try_from(wait).unwrap_or(u64::MAX))
}

/// Armed [`Schedule`] owned by a module actor.
pub(crate) struct Ticker {
    interval: Option<Interval>,
    trigger: Option<Trigger>,
}

impl Ticker {
    /// Completes on the next periodic tick or trigger item.
    ///
    /// Pending forever when neither source is left.
    pub async fn next(&mut self) {
        let Ticker { interval, trigger } = self;
        loop {
            let fired = tokio::select! {
                _ = tick(interval) => true,
                item = next_item(trigger) => item.is_some(),
            };
            if fired {
                return;
            }
            tracing::debug!("push trigger ended; falling back to periodic ticks");
            *trigger = None;
        }
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => pending().await,
    }
}

async fn next_item(trigger: &mut Option<Trigger>) -> Option<()> {
    match trigger {
        Some(t) => t.next().await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::sync::mpsc;

    #[test]
    fn boundary_math() {
        let t = UNIX_EPOCH + Duration::from_millis(10_250);
        assert_eq!(until_boundary(t, Duration::from_secs(1)), Duration::from_millis(750));
        let exact = UNIX_EPOCH + Duration::from_secs(10);
        assert_eq!(until_boundary(exact, Duration::from_secs(1)), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn every_waits_one_full_period_first() {
        let mut ticker = Schedule::every(Duration::from_secs(2)).into_ticker();
        let start = Instant::now();
        ticker.next().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        ticker.next().await;
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn push_ticks_on_trigger_items() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let trigger = stream::poll_fn(move |cx| rx.poll_recv(cx));
        let mut ticker = Schedule::push(trigger).into_ticker();

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_millis(1), ticker.next())
            .await
            .expect("trigger item should tick");
        assert!(
            tokio::time::timeout(Duration::from_secs(60), ticker.next())
                .await
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ended_trigger_falls_back_to_interval() {
        let mut ticker = Schedule::push(stream::empty())
            .and_every(Duration::from_secs(5))
            .into_ticker();
        let start = Instant::now();
        ticker.next().await;
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_never_ticks_on_its_own() {
        let mut ticker = Schedule::manual().into_ticker();
        assert!(
            tokio::time::timeout(Duration::from_secs(3600), ticker.next())
                .await
                .is_err()
        );
    }
}
