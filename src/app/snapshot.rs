//! The polled mower snapshot.
//!
//! A [`Snapshot`] is produced whole by one successful poll cycle and then
//! never mutated.  Out-of-domain readings (see [`Malformed`]) are dropped
//! field by field so the rest of the snapshot stays usable.

use chrono::{DateTime, FixedOffset};
use log::warn;
use serde::Serialize;

use crate::error::{Field, Malformed};
use crate::resolver::{self, ActivityCode, NormalizedActivity, StateCode};

/// Wire format of the next-start timestamp.
pub const NEXT_START_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// A point-in-time view of the mower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Increments by one for every installed snapshot, starting at 1.
    pub revision: u64,
    /// Battery charge (0–100), absent if the reading was out of range.
    pub battery_level: Option<u8>,
    pub activity: ActivityCode,
    pub state: StateCode,
    /// Absent when unscheduled, unread, or unparseable.
    pub next_start_time: Option<DateTime<FixedOffset>>,
}

impl Snapshot {
    /// Normalized activity for this snapshot.
    pub fn normalized(&self) -> NormalizedActivity {
        resolver::resolve_codes(&self.state, &self.activity)
    }
}

/// Validate a raw battery reading.
pub fn parse_battery_level(raw: i32) -> Result<u8, Malformed> {
    u8::try_from(raw)
        .ok()
        .filter(|level| *level <= 100)
        .ok_or_else(|| Malformed::new(Field::BatteryLevel, raw.to_string()))
}

/// Parse a next-start reading.  Empty text means "not scheduled".
pub fn parse_next_start_time(raw: &str) -> Result<Option<DateTime<FixedOffset>>, Malformed> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_str(raw, NEXT_START_FORMAT)
        .map(Some)
        .map_err(|_| Malformed::new(Field::NextStartTime, raw))
}

/// Turn a [`Malformed`] result into an absent field, logging why.
pub(crate) fn or_absent<T>(parsed: Result<Option<T>, Malformed>) -> Option<T> {
    parsed.unwrap_or_else(|e| {
        warn!("Dropping {e}");
        None
    })
}
