//! Consumer-side derived values.
//!
//! The host exposes three entities per mower: the lawn mower itself
//! (normalized activity), a battery sensor, and a next-start timestamp
//! sensor.  [`MowerView`] computes all three from the current snapshot
//! plus link health, applying the availability rule: a consumer is
//! available only while the link is healthy *and* a snapshot exists.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::app::snapshot::Snapshot;
use crate::resolver::NormalizedActivity;

/// Which consumer entity a unique id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    LawnMower,
    BatteryLevel,
    NextStartTime,
}

/// Immutable address/model pair for one mower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MowerIdentity {
    pub address: String,
    pub model: String,
}

impl MowerIdentity {
    pub fn new(address: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            model: model.into(),
        }
    }

    /// Stable unique id for a consumer entity.
    ///
    /// `automower{model}_{address}` with a `_battery_level` or
    /// `_next_start_time` suffix for the sensors.
    pub fn unique_id(&self, kind: EntityKind) -> String {
        let base = format!("automower{}_{}", self.model, self.address);
        match kind {
            EntityKind::LawnMower => base,
            EntityKind::BatteryLevel => base + "_battery_level",
            EntityKind::NextStartTime => base + "_next_start_time",
        }
    }
}

/// What consumers display, derived at observation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MowerView {
    /// `None` until the first snapshot arrives.
    pub activity: Option<NormalizedActivity>,
    pub battery_level: Option<u8>,
    pub next_start_time: Option<DateTime<FixedOffset>>,
    /// Lawn-mower entity availability.
    pub available: bool,
    link_healthy: bool,
}

impl MowerView {
    /// Derive the view.
    ///
    /// `link_healthy` is the caller's current verdict on the session
    /// (connected, and the latest cycle did not fail).
    pub fn derive(snapshot: Option<&Snapshot>, link_healthy: bool) -> Self {
        Self {
            activity: snapshot.map(Snapshot::normalized),
            battery_level: snapshot.and_then(|s| s.battery_level),
            next_start_time: snapshot.and_then(|s| s.next_start_time),
            available: link_healthy && snapshot.is_some(),
            link_healthy,
        }
    }

    /// Battery sensor availability: needs a valid reading too.
    pub fn battery_available(&self) -> bool {
        self.link_healthy && self.battery_level.is_some()
    }

    /// Next-start sensor availability: needs a parsed timestamp too.
    pub fn next_start_available(&self) -> bool {
        self.link_healthy && self.next_start_time.is_some()
    }
}
