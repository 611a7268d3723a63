//! Collector for Lustre 2.x server statistics.
//!
//! Lustre stores statistics about its activity under `/proc/fs/lustre`,
//! one directory per target:
//!
//! ```text
//! /proc/fs/lustre/obdfilter/<ost>/stats       byte and call counters
//! /proc/fs/lustre/osd-ldiskfs/<ost>/stats     page cache counters
//! /proc/fs/lustre/obdfilter/<ost>/job_stats   per-job OST counters
//! /proc/fs/lustre/mdt/<mdt>/md_stats          metadata operation counters
//! /proc/fs/lustre/mdt/<mdt>/job_stats         per-job MDT counters
//! ```
//!
//! A scan walks these files line by line, extracts values with the rules in
//! [`mapping`], accumulates them per target (and per job) in
//! [`aggregator::StatAggregator`], and drains one record per bucket.

pub mod aggregator;
#[allow(clippy::module_inception)]
mod collector;
pub mod mapping;
pub mod parser;

pub use aggregator::{InvalidValue, SourceKey, StatAggregator, TAG_JOBID, TAG_NAME};
pub use collector::{CollectError, Lustre2Collector, Lustre2Snapshot, ScanTiming};
pub use mapping::{ExtractionRule, StatsVariant, TargetKind};
pub use parser::{ParseError, ParsedLine, parse_line, resolve_target};
