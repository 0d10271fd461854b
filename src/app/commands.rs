//! Inbound commands to the mower.
//!
//! Issued by consumers (a lawn-mower entity, a CLI, a script) and
//! executed by [`PollingCoordinator::execute`](super::coordinator::PollingCoordinator::execute),
//! which follows each one with an immediate refresh.

use core::fmt;

/// Commands the host can send to the mower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MowerCommand {
    /// Resume mowing.  Leaving the dock additionally needs an override.
    Start,

    /// Return to the charging station and park.
    Dock,

    /// Pause in place.
    Pause,
}

impl fmt::Display for MowerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Dock => write!(f, "dock"),
            Self::Pause => write!(f, "pause"),
        }
    }
}
