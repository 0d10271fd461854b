//! Fixed-cadence poll schedule.
//!
//! Drives the periodic refresh.  The schedule knows nothing about BLE or
//! snapshots: it invokes a caller-supplied tick future once immediately
//! and then once per period, until [`PollSchedule::cancel`] is called.
//!
//! ```text
//!  ┌──────────────┐  tick()   ┌──────────────────────┐
//!  │ PollSchedule │──────────▶│ PollingCoordinator   │
//!  │  (Ticker)    │           │   .refresh()         │
//!  └──────▲───────┘           └──────────────────────┘
//!         │ cancel()
//!   shutdown()
//! ```
//!
//! Ticks never overlap and never bunch up: the period is measured from
//! the end of the previous tick, so a slow tick delays the next one
//! instead of triggering a catch-up burst.

use core::cell::Cell;
use core::future::Future;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use futures_lite::future;
use log::{debug, info};

/// Cancellable periodic schedule.
pub struct PollSchedule {
    period: Duration,
    cancelled: Cell<bool>,
    stop: Signal<NoopRawMutex, ()>,
}

impl PollSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            cancelled: Cell::new(false),
            stop: Signal::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the schedule.  Safe to call repeatedly and before [`run`](Self::run).
    pub fn cancel(&self) {
        if !self.cancelled.replace(true) {
            info!("Schedule: cancelled");
            self.stop.signal(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Run `tick` now and then one period after each tick returns, until
    /// cancelled.
    ///
    /// Returns once cancelled.  A cancel that lands mid-tick lets the tick
    /// finish; no further tick is started.
    pub async fn run<F, Fut>(&self, mut tick: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        info!("Schedule: every {} ms", self.period.as_millis());
        let mut ticker = Ticker::every(self.period);

        while !self.is_cancelled() {
            tick().await;
            // Drop periods missed while the tick ran.
            ticker.reset();

            let stopped = future::or(
                async {
                    self.stop.wait().await;
                    true
                },
                async {
                    ticker.next().await;
                    false
                },
            )
            .await;

            if stopped {
                break;
            }
        }
        debug!("Schedule: loop exited");
    }
}
