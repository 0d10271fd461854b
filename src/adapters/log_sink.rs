//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every coordinator event to the
//! `log` facade.  Useful as a default subscriber and in the simulator.

use log::{info, warn};

use crate::app::events::MowerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`MowerEvent`].
pub struct LogEventSink {
    label: String,
}

impl LogEventSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MowerEvent) {
        match event {
            MowerEvent::Snapshot(s) => {
                let battery = s
                    .battery_level
                    .map_or_else(|| "n/a".to_string(), |b| format!("{b}%"));
                let next = s
                    .next_start_time
                    .map_or_else(|| "none".to_string(), |t| t.to_rfc3339());
                info!(
                    "MOWER {} | r{} | {} | battery={} | state={} activity={} | next_start={}",
                    self.label,
                    s.revision,
                    s.normalized(),
                    battery,
                    s.state,
                    s.activity,
                    next,
                );
            }
            MowerEvent::Failure(e) => {
                warn!("MOWER {} | unavailable | {}", self.label, e);
            }
        }
    }
}
