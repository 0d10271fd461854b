//! Mock mower session for integration tests.
//!
//! Records every driver call so tests can assert on the exact read and
//! command sequence without a radio.  Every read yields once before
//! answering, which lets two coordinator futures interleave under
//! `futures_lite::future::zip`.

use std::cell::{Cell, RefCell};

use futures_lite::future;
use mowerlink::PollingCoordinator;
use mowerlink::app::events::MowerEvent;
use mowerlink::app::ports::MowerSession;
use mowerlink::config::MowerConfig;
use mowerlink::error::{DriverError, Field};

pub const ADDRESS: &str = "60:98:66:AA:BB:CC";
pub const MODEL: &str = "305";

// ── Driver call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    Connect,
    Disconnect,
    ReadBattery,
    ReadActivity,
    ReadState,
    ReadNextStart,
    Resume,
    Override,
    Park,
    Pause,
}

pub const FULL_CYCLE: [DriverCall; 4] = [
    DriverCall::ReadBattery,
    DriverCall::ReadActivity,
    DriverCall::ReadState,
    DriverCall::ReadNextStart,
];

// ── MockMower ─────────────────────────────────────────────────

pub struct MockMower {
    calls: RefCell<Vec<DriverCall>>,
    connected: Cell<bool>,
    connect_ok: Cell<bool>,
    hang_reads: Cell<bool>,
    fail_commands: Cell<bool>,
    failing: RefCell<Vec<Field>>,

    battery: Cell<i32>,
    activity: RefCell<String>,
    state: RefCell<String>,
    next_start: RefCell<Option<String>>,
}

#[allow(dead_code)]
impl MockMower {
    /// Connected, docked and charging at 57 %.
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            connected: Cell::new(true),
            connect_ok: Cell::new(true),
            hang_reads: Cell::new(false),
            fail_commands: Cell::new(false),
            failing: RefCell::new(Vec::new()),
            battery: Cell::new(57),
            activity: RefCell::new("MowerActivity.CHARGING".into()),
            state: RefCell::new("MowerState.RESTRICTED".into()),
            next_start: RefCell::new(Some("2024-06-01 09:30:00+0200".into())),
        }
    }

    pub fn disconnected() -> Self {
        let mower = Self::new();
        mower.connected.set(false);
        mower
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: DriverCall) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn drop_link(&self) {
        self.connected.set(false);
    }

    pub fn refuse_connect(&self) {
        self.connect_ok.set(false);
    }

    pub fn fail_read(&self, field: Field) {
        self.failing.borrow_mut().push(field);
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
        self.hang_reads.set(false);
        self.fail_commands.set(false);
    }

    pub fn hang_reads(&self) {
        self.hang_reads.set(true);
    }

    pub fn fail_commands(&self) {
        self.fail_commands.set(true);
    }

    pub fn set_battery(&self, level: i32) {
        self.battery.set(level);
    }

    pub fn set_codes(&self, state: &str, activity: &str) {
        *self.state.borrow_mut() = state.into();
        *self.activity.borrow_mut() = activity.into();
    }

    pub fn set_next_start(&self, raw: Option<&str>) {
        *self.next_start.borrow_mut() = raw.map(str::to_string);
    }

    async fn answer<T>(&self, call: DriverCall, field: Field, value: T) -> Result<T, DriverError> {
        self.calls.borrow_mut().push(call);
        future::yield_now().await;
        if self.hang_reads.get() {
            future::pending::<()>().await;
        }
        if !self.connected.get() {
            return Err(DriverError::NotConnected);
        }
        if self.failing.borrow().contains(&field) {
            return Err(DriverError::Gatt(format!("{field} characteristic unreadable")));
        }
        Ok(value)
    }

    async fn command(&self, call: DriverCall) -> Result<(), DriverError> {
        self.calls.borrow_mut().push(call);
        future::yield_now().await;
        if !self.connected.get() {
            return Err(DriverError::NotConnected);
        }
        if self.fail_commands.get() {
            return Err(DriverError::Gatt("write rejected".into()));
        }
        Ok(())
    }
}

impl Default for MockMower {
    fn default() -> Self {
        Self::new()
    }
}

impl MowerSession for MockMower {
    type Handle = ();

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    async fn connect(&self, _handle: ()) -> bool {
        self.calls.borrow_mut().push(DriverCall::Connect);
        future::yield_now().await;
        let ok = self.connect_ok.get();
        self.connected.set(ok);
        ok
    }

    async fn disconnect(&self) -> Result<(), DriverError> {
        self.calls.borrow_mut().push(DriverCall::Disconnect);
        self.connected.set(false);
        Ok(())
    }

    async fn read_battery_level(&self) -> Result<i32, DriverError> {
        self.answer(DriverCall::ReadBattery, Field::BatteryLevel, self.battery.get())
            .await
    }

    async fn read_activity(&self) -> Result<String, DriverError> {
        let value = self.activity.borrow().clone();
        self.answer(DriverCall::ReadActivity, Field::Activity, value)
            .await
    }

    async fn read_state(&self) -> Result<String, DriverError> {
        let value = self.state.borrow().clone();
        self.answer(DriverCall::ReadState, Field::State, value).await
    }

    async fn read_next_start_time(&self) -> Result<Option<String>, DriverError> {
        let value = self.next_start.borrow().clone();
        self.answer(DriverCall::ReadNextStart, Field::NextStartTime, value)
            .await
    }

    async fn command_resume(&self) -> Result<(), DriverError> {
        self.command(DriverCall::Resume).await
    }

    async fn command_override(&self) -> Result<(), DriverError> {
        self.command(DriverCall::Override).await
    }

    async fn command_park(&self) -> Result<(), DriverError> {
        self.command(DriverCall::Park).await
    }

    async fn command_pause(&self) -> Result<(), DriverError> {
        self.command(DriverCall::Pause).await
    }
}

// ── Coordinator helpers ───────────────────────────────────────

pub type Resolver = fn(&str) -> Option<()>;

pub fn found(_address: &str) -> Option<()> {
    Some(())
}

#[allow(dead_code)]
pub fn missing(_address: &str) -> Option<()> {
    None
}

pub fn config() -> MowerConfig {
    MowerConfig::new(ADDRESS, MODEL)
}

pub fn coordinator(mower: MockMower) -> PollingCoordinator<MockMower, Resolver> {
    with_config(mower, config())
}

pub fn with_config(
    mower: MockMower,
    config: MowerConfig,
) -> PollingCoordinator<MockMower, Resolver> {
    PollingCoordinator::new(config, mower, found as Resolver).unwrap()
}

// ── Event capture ─────────────────────────────────────────────

/// Shared event log fed by [`Recorder::sink`].
#[derive(Clone, Default)]
pub struct Recorder(std::rc::Rc<RefCell<Vec<MowerEvent>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn events(&self) -> Vec<MowerEvent> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// A sink that appends to this recorder.
    pub fn sink(&self) -> impl FnMut(&MowerEvent) + use<> {
        let log = self.0.clone();
        move |event: &MowerEvent| log.borrow_mut().push(event.clone())
    }

    pub fn failures(&self) -> usize {
        self.0.borrow().iter().filter(|e| e.is_failure()).count()
    }
}
