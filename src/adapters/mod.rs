//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter     | Implements                        | Connects to            |
//! |-------------|-----------------------------------|------------------------|
//! | `log_sink`  | EventSink                         | `log` output           |
//! | `sim`       | MowerSession, TransportResolver   | In-memory mower model  |
//!
//! The real BLE driver lives outside this crate and implements
//! [`MowerSession`](crate::app::ports::MowerSession) the same way `sim` does.

pub mod log_sink;
pub mod sim;
