//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the coordinator against
//! the recording [`mock_mower::MockMower`].  Everything runs on the host
//! with `futures_lite::future::block_on`; no radio required.

mod command_tests;
mod mock_mower;
