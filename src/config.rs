//! Link configuration
//!
//! Everything the coordinator needs to know about one mower.  The host
//! supplies it at construction (typically from its own persisted entry)
//! and it stays fixed for the coordinator's lifetime.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL_SECS: u32 = 60;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MowerConfig {
    // --- Identity ---
    /// Stable BLE address of the mower (e.g. `60:98:66:AA:BB:CC`)
    pub address: String,
    /// Model descriptor reported at pairing time (e.g. `305`)
    pub model: String,

    // --- Timing ---
    /// Period of the scheduled refresh (seconds)
    pub poll_interval_secs: u32,
    /// Upper bound on any single driver call (milliseconds, 0 = driver decides)
    pub io_timeout_ms: u32,

    // --- Reads ---
    /// Issue the optional fourth read for the next scheduled start
    pub read_next_start_time: bool,
}

impl Default for MowerConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            model: String::new(),

            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            io_timeout_ms: 0,

            read_next_start_time: true,
        }
    }
}

impl MowerConfig {
    pub fn new(address: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("address must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("model must not be empty"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_secs must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> embassy_time::Duration {
        embassy_time::Duration::from_secs(u64::from(self.poll_interval_secs))
    }

    /// `None` when driver calls are left to the transport's own timeouts.
    pub fn io_timeout(&self) -> Option<embassy_time::Duration> {
        (self.io_timeout_ms > 0)
            .then(|| embassy_time::Duration::from_millis(u64::from(self.io_timeout_ms)))
    }
}
