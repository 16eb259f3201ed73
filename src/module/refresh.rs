//! # On-demand ticks.
//!
//! Every module gets a [`Refresh`] handle. Click actions and the module itself
//! use it to ask for a tick outside of the schedule: right away
//! ([`Refresh::now`]) or once after a delay ([`Refresh::after`]).
//!
//! Requests coalesce: any number of `now()` calls made while the module is
//! busy result in a single extra tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Cloneable handle that wakes one module actor.
#[derive(Clone, Debug, Default)]
pub struct Refresh {
    notify: Arc<Notify>,
}

impl Refresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a tick as soon as the module is idle.
    pub fn now(&self) {
        self.notify.notify_one();
    }

    /// One-shot timer: requests a tick after `delay`.
    ///
    /// Must be called from within a Tokio runtime. Aborting the returned
    /// handle cancels the request.
    pub fn after(&self, delay: Duration) -> JoinHandle<()> {
        let notify = Arc::clone(&self.notify);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notify.notify_one();
        })
    }

    /// Completes once a refresh was requested.
    pub(crate) async fn requested(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn requests_coalesce() {
        let refresh = Refresh::new();
        refresh.now();
        refresh.now();
        refresh.requested().await;

        let second = tokio::time::timeout(Duration::from_millis(10), refresh.requested()).await;
        assert!(second.is_err(), "two now() calls must yield a single wake-up");
    }

    #[tokio::test(start_paused = true)]
    async fn after_fires_once_the_delay_elapsed() {
        let refresh = Refresh::new();
        let start = tokio::time::Instant::now();
        refresh.after(Duration::from_secs(3));
        refresh.requested().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
