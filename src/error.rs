//! Error types for the mower link.
//!
//! A single [`Error`] enum covers everything the coordinator can report to
//! a caller or subscriber.  Every variant is transient: the next scheduled
//! poll retries from scratch, and only an explicit shutdown ends the loop.
//!
//! [`Malformed`] is deliberately *not* an [`Error`] variant.  A read that
//! succeeds with an out-of-domain value does not fail the cycle; the field
//! is dropped from the snapshot and a warning is logged.

use core::fmt;

use crate::app::commands::MowerCommand;

// ---------------------------------------------------------------------------
// Snapshot fields
// ---------------------------------------------------------------------------

/// The values read from the mower during one poll cycle, in read order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BatteryLevel,
    Activity,
    State,
    NextStartTime,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BatteryLevel => write!(f, "battery level"),
            Self::Activity => write!(f, "activity"),
            Self::State => write!(f, "state"),
            Self::NextStartTime => write!(f, "next start time"),
        }
    }
}

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

/// Failure reported by the BLE driver for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The link dropped before or during the call.
    NotConnected,
    /// The call did not complete in time (driver- or coordinator-enforced).
    Timeout,
    /// GATT-level failure with the driver's description.
    Gatt(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Timeout => write!(f, "timed out"),
            Self::Gatt(msg) => write!(f, "GATT error: {msg}"),
        }
    }
}

impl std::error::Error for DriverError {}

// ---------------------------------------------------------------------------
// Connection failures
// ---------------------------------------------------------------------------

/// Why a reconnect attempt did not produce a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailure {
    /// No connectable transport handle is currently known for the address.
    DeviceNotFound,
    /// The driver refused or failed the connect.
    Refused,
    /// The connect did not finish within the configured I/O timeout.
    Timeout,
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotFound => write!(f, "device not in range"),
            Self::Refused => write!(f, "connect refused"),
            Self::Timeout => write!(f, "connect timed out"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every failed refresh or command funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The session was down and the single reconnect attempt failed.
    Connection(ConnectFailure),
    /// A core read failed mid-cycle; the previous snapshot is retained.
    Read { field: Field, cause: DriverError },
    /// The driver rejected a command; no refresh was induced.
    Command {
        command: MowerCommand,
        cause: DriverError,
    },
    /// The coordinator has been shut down.
    ShutdownInProgress,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::Read { field, cause } => write!(f, "reading {field}: {cause}"),
            Self::Command { command, cause } => write!(f, "command {command}: {cause}"),
            Self::ShutdownInProgress => write!(f, "shutdown in progress"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { cause, .. } | Self::Command { cause, .. } => Some(cause),
            Self::Connection(_) | Self::ShutdownInProgress => None,
        }
    }
}

impl From<ConnectFailure> for Error {
    fn from(e: ConnectFailure) -> Self {
        Self::Connection(e)
    }
}

// ---------------------------------------------------------------------------
// Malformed data
// ---------------------------------------------------------------------------

/// A read succeeded but its value lies outside the field's domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    pub field: Field,
    pub raw: String,
}

impl Malformed {
    pub fn new(field: Field, raw: impl Into<String>) -> Self {
        Self {
            field,
            raw: raw.into(),
        }
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed {}: {:?}", self.field, self.raw)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`MowerConfig`](crate::config::MowerConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// A field failed validation.  The message names the field and why.
    ValidationFailed(&'static str),
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::ValidationFailed(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
