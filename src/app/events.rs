//! Outbound coordinator events.
//!
//! The [`PollingCoordinator`](super::coordinator::PollingCoordinator)
//! delivers one of these to every subscribed
//! [`EventSink`](super::ports::EventSink) after each poll cycle.
//! Subscribers recompute their derived values from it (or from
//! [`PollingCoordinator::view`](super::coordinator::PollingCoordinator::view)).

use crate::error::Error;

use super::snapshot::Snapshot;

/// Result of one poll cycle as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum MowerEvent {
    /// A new snapshot was installed.
    Snapshot(Snapshot),

    /// The cycle failed; the previous snapshot (if any) is still current
    /// and consumers should report themselves unavailable.
    Failure(Error),
}

impl MowerEvent {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Snapshot(s) => Some(s),
            Self::Failure(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}
