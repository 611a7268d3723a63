//! lustre2 - Lustre 2.x server statistics collector library.
//!
//! This library provides the core functionality used by:
//! - `lustre2d` - daemon that periodically scans Lustre `/proc` statistics
//!   and emits tagged metric records

pub mod collector;
pub mod config;
pub mod sink;
