//! Port traits: the boundary between the coordinator and the outside world.
//!
//! ```text
//!   BLE driver ──▶ MowerSession ─┐
//!                                ├──▶ PollingCoordinator ──▶ EventSink(s)
//!   Host BT stack ──▶ TransportResolver ┘
//! ```
//!
//! The driver library owns the GATT details; the coordinator only sees
//! these traits and consumes them via generics, so every test runs
//! against an in-memory session.
//!
//! ## Threading
//!
//! Session methods take `&self`.  The coordinator guarantees that at most
//! one of them is in flight at a time, but drivers must still be safe to
//! call [`MowerSession::is_connected`] concurrently with an outstanding
//! read, since liveness is observed outside the exclusion boundary.

use crate::error::DriverError;

use super::events::MowerEvent;

// ───────────────────────────────────────────────────────────────
// Session port (driven adapter: BLE driver ↔ coordinator)
// ───────────────────────────────────────────────────────────────

/// A connection-oriented link to one mower.
#[allow(async_fn_in_trait)]
pub trait MowerSession {
    /// Transport handle produced by a [`TransportResolver`].
    type Handle;

    /// Liveness check.  Never cached by callers.
    fn is_connected(&self) -> bool;

    /// Open the link.  Returns `false` if the mower could not be reached.
    async fn connect(&self, handle: Self::Handle) -> bool;

    /// Close the link gracefully.
    async fn disconnect(&self) -> Result<(), DriverError>;

    /// Battery charge in percent.  Values outside 0–100 are possible.
    async fn read_battery_level(&self) -> Result<i32, DriverError>;

    /// Raw activity text (e.g. `MowerActivity.CHARGING`).
    async fn read_activity(&self) -> Result<String, DriverError>;

    /// Raw state text (e.g. `MowerState.RESTRICTED`).
    async fn read_state(&self) -> Result<String, DriverError>;

    /// Next scheduled start as `%Y-%m-%d %H:%M:%S%z`, or `None` if unscheduled.
    async fn read_next_start_time(&self) -> Result<Option<String>, DriverError>;

    async fn command_resume(&self) -> Result<(), DriverError>;

    /// Confirm leaving the dock after a resume.
    async fn command_override(&self) -> Result<(), DriverError>;

    async fn command_park(&self) -> Result<(), DriverError>;

    async fn command_pause(&self) -> Result<(), DriverError>;
}

// ───────────────────────────────────────────────────────────────
// Transport resolution (driven adapter: host BT stack → coordinator)
// ───────────────────────────────────────────────────────────────

/// Looks up a currently connectable transport handle for an address.
///
/// Called once per reconnect attempt, so a handle is never reused across
/// radio dropouts.
pub trait TransportResolver<H> {
    fn resolve(&self, address: &str) -> Option<H>;
}

impl<F, H> TransportResolver<H> for F
where
    F: Fn(&str) -> Option<H>,
{
    fn resolve(&self, address: &str) -> Option<H> {
        self(address)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: coordinator → consumers)
// ───────────────────────────────────────────────────────────────

/// Receives every [`MowerEvent`].  Closures implement it directly.
pub trait EventSink {
    fn emit(&mut self, event: &MowerEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&MowerEvent),
{
    fn emit(&mut self, event: &MowerEvent) {
        self(event);
    }
}
