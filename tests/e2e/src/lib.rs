//! End-to-end test support for Reverie
//!
//! Shared harness and fixture code for the journey tests:
//! - [`harness`]: isolated temporary stores per test
//! - [`mocks`]: realistic experience batches for seeding

pub mod harness;
pub mod mocks;
