//! Simulated mower session.
//!
//! An in-memory [`MowerSession`] that behaves like a small robotic mower:
//! it mows until the battery runs low, drives home, charges, and reacts
//! to resume/override/park/pause the way the real firmware does
//! (leaving the dock needs a resume *and* an override).  It speaks the
//! driver's raw vocabulary (`MowerState.IN_OPERATION`, …) so the full
//! normalization path is exercised.
//!
//! Every battery read advances the model by one step.

use core::cell::{Cell, RefCell};

use chrono::Utc;
use embassy_time::{Duration, Timer};
use log::{debug, info};

use crate::app::ports::MowerSession;
use crate::app::snapshot::NEXT_START_FORMAT;
use crate::error::DriverError;

/// Transport handle for the simulator; always resolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimHandle;

/// Resolver for [`SimulatedMower`].
pub fn resolve_sim(_address: &str) -> Option<SimHandle> {
    Some(SimHandle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Charging,
    Parked,
    GoingOut,
    Mowing,
    GoingHome,
}

impl Phase {
    fn activity(self) -> &'static str {
        match self {
            Self::Charging => "MowerActivity.CHARGING",
            Self::Parked => "MowerActivity.PARKED",
            Self::GoingOut => "MowerActivity.GOING_OUT",
            Self::Mowing => "MowerActivity.MOWING",
            Self::GoingHome => "MowerActivity.GOING_HOME",
        }
    }

    fn docked(self) -> bool {
        matches!(self, Self::Charging | Self::Parked)
    }
}

#[derive(Debug)]
struct Model {
    phase: Phase,
    paused: bool,
    battery: i32,
    awaiting_override: bool,
}

impl Model {
    fn state(&self) -> &'static str {
        if self.paused {
            "MowerState.PAUSED"
        } else if self.phase.docked() {
            "MowerState.RESTRICTED"
        } else {
            "MowerState.IN_OPERATION"
        }
    }

    fn step(&mut self) {
        if self.paused {
            return;
        }
        match self.phase {
            Phase::Charging => {
                self.battery = (self.battery + 5).min(100);
                if self.battery == 100 {
                    self.phase = Phase::Parked;
                }
            }
            Phase::Parked => {}
            Phase::GoingOut => self.phase = Phase::Mowing,
            Phase::Mowing => {
                self.battery = (self.battery - 2).max(0);
                if self.battery <= 20 {
                    self.phase = Phase::GoingHome;
                }
            }
            Phase::GoingHome => self.phase = Phase::Charging,
        }
    }
}

/// In-memory mower implementing [`MowerSession`].
pub struct SimulatedMower {
    connected: Cell<bool>,
    model: RefCell<Model>,
    latency: Duration,
    reads: Cell<u64>,
    drop_every: Option<u64>,
}

impl SimulatedMower {
    /// A docked mower at 57 % charge, initially disconnected.
    pub fn new() -> Self {
        Self {
            connected: Cell::new(false),
            model: RefCell::new(Model {
                phase: Phase::Charging,
                paused: false,
                battery: 57,
                awaiting_override: false,
            }),
            latency: Duration::from_millis(20),
            reads: Cell::new(0),
            drop_every: None,
        }
    }

    /// Drop the link after every `reads` reads to exercise reconnects.
    #[must_use]
    pub fn with_dropouts(mut self, reads: u64) -> Self {
        self.drop_every = (reads > 0).then_some(reads);
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulate the radio link going away.
    pub fn drop_link(&self) {
        if self.connected.replace(false) {
            info!("Sim: link dropped");
        }
    }

    async fn round_trip(&self) -> Result<(), DriverError> {
        if !self.connected.get() {
            return Err(DriverError::NotConnected);
        }
        Timer::after(self.latency).await;
        if self.connected.get() {
            Ok(())
        } else {
            Err(DriverError::NotConnected)
        }
    }

    async fn read_with<T>(&self, f: impl FnOnce(&mut Model) -> T) -> Result<T, DriverError> {
        self.round_trip().await?;
        let value = f(&mut *self.model.borrow_mut());

        let n = self.reads.get() + 1;
        self.reads.set(n);
        if self.drop_every.is_some_and(|every| n % every == 0) {
            self.drop_link();
        }
        Ok(value)
    }
}

impl Default for SimulatedMower {
    fn default() -> Self {
        Self::new()
    }
}

impl MowerSession for SimulatedMower {
    type Handle = SimHandle;

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    async fn connect(&self, _handle: SimHandle) -> bool {
        Timer::after(self.latency).await;
        self.connected.set(true);
        debug!("Sim: connected");
        true
    }

    async fn disconnect(&self) -> Result<(), DriverError> {
        self.connected.set(false);
        debug!("Sim: disconnected");
        Ok(())
    }

    async fn read_battery_level(&self) -> Result<i32, DriverError> {
        self.read_with(|m| {
            m.step();
            m.battery
        })
        .await
    }

    async fn read_activity(&self) -> Result<String, DriverError> {
        self.read_with(|m| m.phase.activity().to_string()).await
    }

    async fn read_state(&self) -> Result<String, DriverError> {
        self.read_with(|m| m.state().to_string()).await
    }

    async fn read_next_start_time(&self) -> Result<Option<String>, DriverError> {
        self.read_with(|m| {
            m.phase.docked().then(|| {
                (Utc::now() + chrono::Duration::hours(2))
                    .format(NEXT_START_FORMAT)
                    .to_string()
            })
        })
        .await
    }

    async fn command_resume(&self) -> Result<(), DriverError> {
        self.round_trip().await?;
        let mut m = self.model.borrow_mut();
        if m.paused {
            m.paused = false;
        } else if m.phase.docked() {
            m.awaiting_override = true;
        }
        Ok(())
    }

    async fn command_override(&self) -> Result<(), DriverError> {
        self.round_trip().await?;
        let mut m = self.model.borrow_mut();
        if m.awaiting_override && m.phase.docked() {
            m.awaiting_override = false;
            m.phase = Phase::GoingOut;
        }
        Ok(())
    }

    async fn command_park(&self) -> Result<(), DriverError> {
        self.round_trip().await?;
        let mut m = self.model.borrow_mut();
        m.paused = false;
        if !m.phase.docked() {
            m.phase = Phase::GoingHome;
        }
        Ok(())
    }

    async fn command_pause(&self) -> Result<(), DriverError> {
        self.round_trip().await?;
        self.model.borrow_mut().paused = true;
        Ok(())
    }
}
