//! Activity resolver: raw `(state, activity)` codes to a normalized activity.
//!
//! The host platform only understands four lawn-mower activities.  The
//! device speaks a much richer vocabulary, so the mapping is lossy by
//! construction:
//!
//! ```text
//!   state                         activity                      result
//!   ─────────────────────────────────────────────────────────────────────
//!   paused                        (any)                         PAUSED
//!   stopped | off |
//!   wait_for_safety_pin           (any)                         ERROR
//!   restricted | in_operation |   charging | parked | none      DOCKED
//!   unknown | check_safety |      going_out | mowing |
//!   pending_start                 going_home                    MOWING
//!   (anything else)               (anything else)               ERROR
//! ```
//!
//! State wins over activity everywhere except in the operating bucket,
//! where the activity decides between docked and mowing.  The mower has
//! no "stopped" output, so stopped/off states surface as ERROR.

pub mod codes;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use codes::{ActivityCode, MowerActivity, MowerState, StateCode};

/// The only activities consumers may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedActivity {
    Mowing,
    Docked,
    Paused,
    Error,
}

impl fmt::Display for NormalizedActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mowing => write!(f, "mowing"),
            Self::Docked => write!(f, "docked"),
            Self::Paused => write!(f, "paused"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Resolve a classified `(state, activity)` pair.
pub fn resolve_kinds(state: MowerState, activity: MowerActivity) -> NormalizedActivity {
    use MowerActivity as A;
    use MowerState as S;

    match state {
        S::Paused => NormalizedActivity::Paused,
        S::Stopped | S::Off | S::WaitForSafetyPin => NormalizedActivity::Error,
        S::Restricted | S::InOperation | S::Unknown | S::CheckSafety | S::PendingStart => {
            match activity {
                A::Charging | A::Parked | A::None => NormalizedActivity::Docked,
                A::GoingOut | A::Mowing | A::GoingHome => NormalizedActivity::Mowing,
                A::StoppedInGarden | A::Unrecognized => NormalizedActivity::Error,
            }
        }
        S::FatalError | S::Error | S::Unrecognized => NormalizedActivity::Error,
    }
}

/// Resolve tagged raw codes.
pub fn resolve_codes(state: &StateCode, activity: &ActivityCode) -> NormalizedActivity {
    resolve_kinds(state.kind(), activity.kind())
}

/// Resolve raw strings.  Total: every input pair yields one of the four values.
pub fn resolve(state: &str, activity: &str) -> NormalizedActivity {
    resolve_kinds(
        StateCode::new(state).kind(),
        ActivityCode::new(activity).kind(),
    )
}
