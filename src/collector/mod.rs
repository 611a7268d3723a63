//! Lustre statistics collector.
//!
//! This module provides infrastructure for scanning the Lustre `/proc`
//! statistics files of a server, with support for mocking for testing on
//! machines without Lustre.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Lustre2Collector                       │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │  │   mapping    │──▶│    parser    │──▶│ StatAggregator │   │
//! │  │ (rule sets)  │   │ (line → kv)  │   │ (target, job)  │   │
//! │  └──────────────┘   └──────▲───────┘   └───────┬────────┘   │
//! │                            │                   │ drain      │
//! │                     ┌──────┴──────┐     ┌──────▼──────┐     │
//! │                     │  FileSystem │     │ MetricSink  │     │
//! │                     └──────┬──────┘     └─────────────┘     │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use lustre2::collector::{Lustre2Collector, RealFs};
//! use lustre2::config::Lustre2Config;
//!
//! let mut collector = Lustre2Collector::new(RealFs::new(), &Lustre2Config::default());
//! let snapshot = collector.collect().unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use lustre2::collector::{Lustre2Collector, MockFs};
//! use lustre2::config::Lustre2Config;
//!
//! let fs = MockFs::lustre_server();
//! let mut collector = Lustre2Collector::new(fs, &Lustre2Config::default());
//! let snapshot = collector.collect().unwrap();
//! assert!(!snapshot.records.is_empty());
//! ```

pub mod lustre;
pub mod mock;
pub mod traits;

pub use lustre::{CollectError, Lustre2Collector, Lustre2Snapshot, ScanTiming};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
