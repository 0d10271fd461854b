//! Mowerlink: BLE robotic lawn mower polling library.
//!
//! Keeps one current snapshot of a mower (battery, activity, state, next
//! scheduled start) fresh over an unreliable BLE link, forwards
//! start/dock/pause commands, and collapses the mower's rich state
//! vocabulary into the four activities a home-automation host displays.
//!
//! The radio itself is behind [`app::ports::MowerSession`]; everything in
//! this crate runs on the host with no hardware attached.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod resolver;
pub mod scheduler;
pub mod view;

pub use app::coordinator::{PollingCoordinator, SubscriptionId};
pub use error::{Error, Result};
pub use resolver::{NormalizedActivity, resolve};
