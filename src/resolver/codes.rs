//! Raw device codes and their typed vocabularies.
//!
//! The driver hands back state and activity as free-form text whose
//! spelling depends on the firmware and the driver version:
//! `MowerState.IN_OPERATION`, `InOperation`, `in_operation` and
//! `inOperation` all name the same state.  [`StateCode`] and
//! [`ActivityCode`] keep the raw text for logging and equality, and
//! classify it into [`MowerState`] / [`MowerActivity`] through a total
//! lookup.  Anything outside the known vocabulary becomes `Unrecognized`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reduce a raw code to its comparison key.
///
/// Takes the token after the last namespace separator (`.` or `::`),
/// keeps ASCII alphanumerics only and lowercases them.
pub fn normalize(raw: &str) -> String {
    let token = raw
        .rsplit(|c: char| c == '.' || c == ':')
        .next()
        .unwrap_or(raw);
    token
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── Mower state ───────────────────────────────────────────────

/// Operational state as reported by the mower firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MowerState {
    Off,
    WaitForSafetyPin,
    Stopped,
    FatalError,
    PendingStart,
    Paused,
    InOperation,
    Restricted,
    Error,
    CheckSafety,
    /// The firmware's own "unknown" state (a real vocabulary entry).
    Unknown,
    /// Text that matches nothing in the vocabulary.
    Unrecognized,
}

impl MowerState {
    fn from_key(key: &str) -> Self {
        match key {
            "off" => Self::Off,
            "waitforsafetypin" => Self::WaitForSafetyPin,
            "stopped" => Self::Stopped,
            "fatalerror" => Self::FatalError,
            "pendingstart" => Self::PendingStart,
            "paused" => Self::Paused,
            "inoperation" => Self::InOperation,
            "restricted" => Self::Restricted,
            "error" => Self::Error,
            "checksafety" => Self::CheckSafety,
            "unknown" => Self::Unknown,
            _ => Self::Unrecognized,
        }
    }
}

// ── Mower activity ────────────────────────────────────────────

/// What the mower is physically doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MowerActivity {
    None,
    Charging,
    GoingOut,
    Mowing,
    GoingHome,
    Parked,
    StoppedInGarden,
    Unrecognized,
}

impl MowerActivity {
    fn from_key(key: &str) -> Self {
        match key {
            "none" => Self::None,
            "charging" => Self::Charging,
            "goingout" => Self::GoingOut,
            "mowing" => Self::Mowing,
            "goinghome" => Self::GoingHome,
            "parked" => Self::Parked,
            "stoppedingarden" => Self::StoppedInGarden,
            _ => Self::Unrecognized,
        }
    }
}

// ── Tagged raw codes ──────────────────────────────────────────

/// Raw state text exactly as read from the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(String);

impl StateCode {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_raw(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> MowerState {
        MowerState::from_key(&normalize(&self.0))
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw activity text exactly as read from the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityCode(String);

impl ActivityCode {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_raw(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> MowerActivity {
        MowerActivity::from_key(&normalize(&self.0))
    }
}

impl fmt::Display for ActivityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
