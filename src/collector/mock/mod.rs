//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing
//! collectors without requiring a running Lustre server.

mod filesystem;
pub mod scenarios;

pub use filesystem::MockFs;
