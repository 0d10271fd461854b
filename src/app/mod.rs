//! Application core: polling, commands and snapshots, zero radio code.
//!
//! All interaction with the mower happens through the **port traits**
//! defined in [`ports`], keeping this layer fully testable against an
//! in-memory session.

pub mod commands;
pub mod coordinator;
pub mod events;
pub mod ports;
pub mod snapshot;
