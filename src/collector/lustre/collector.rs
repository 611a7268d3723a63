//! Scan orchestration: globs, files, lines, aggregation, records.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::aggregator::{InvalidValue, StatAggregator};
use super::mapping::{StatsVariant, TargetKind, rules_for};
use super::parser::{ParseError, parse_line, resolve_target};
use crate::collector::traits::FileSystem;
use crate::config::Lustre2Config;
use crate::sink::{MEASUREMENT, MetricSink, Record};

/// Error type for scan failures.
///
/// Any error aborts the whole scan; no records are produced for it.
#[derive(Debug)]
pub enum CollectError {
    /// A configured glob is not a valid pattern.
    GlobSyntax {
        pattern: String,
        source: glob::PatternError,
    },
    /// A matched statistics file could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A matched file path has no directory naming its target.
    UnresolvedTarget { path: PathBuf, source: ParseError },
    /// A line lacks the column a matching rule reads.
    MalformedLine {
        path: PathBuf,
        line: usize,
        source: ParseError,
    },
    /// An extracted value is not an unsigned integer.
    NumericConversion {
        path: PathBuf,
        line: usize,
        source: InvalidValue,
    },
    /// The sink rejected a record.
    Sink(std::io::Error),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::GlobSyntax { pattern, source } => {
                write!(f, "invalid glob '{}': {}", pattern, source)
            }
            CollectError::FileRead { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            CollectError::UnresolvedTarget { path, source } => {
                write!(f, "cannot resolve target of {}: {}", path.display(), source)
            }
            CollectError::MalformedLine { path, line, source } => {
                write!(f, "malformed line {}:{}: {}", path.display(), line, source)
            }
            CollectError::NumericConversion { path, line, source } => {
                write!(f, "{}:{}: {}", path.display(), line, source)
            }
            CollectError::Sink(e) => write!(f, "sink error: {}", e),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::GlobSyntax { source, .. } => Some(source),
            CollectError::FileRead { source, .. } => Some(source),
            CollectError::UnresolvedTarget { source, .. } => Some(source),
            CollectError::MalformedLine { source, .. } => Some(source),
            CollectError::NumericConversion { source, .. } => Some(source),
            CollectError::Sink(e) => Some(e),
        }
    }
}

/// Timing and volume of the last scan.
#[derive(Debug, Clone, Default)]
pub struct ScanTiming {
    /// Total scan time.
    pub total: Duration,
    /// Statistics files read.
    pub files: usize,
    /// Lines parsed across all files.
    pub lines: usize,
    /// Records drained.
    pub records: usize,
}

/// Records of one successful scan.
#[derive(Debug, Clone)]
pub struct Lustre2Snapshot {
    /// Time the scan started.
    pub timestamp: DateTime<Utc>,
    pub records: Vec<Record>,
}

/// Scans Lustre statistics files into records.
///
/// Each call to `collect()` uses a fresh aggregator, so no state survives
/// between scans.
pub struct Lustre2Collector<F: FileSystem> {
    fs: F,
    ost_globs: Vec<String>,
    mdt_globs: Vec<String>,
    last_timing: Option<ScanTiming>,
}

impl<F: FileSystem> Lustre2Collector<F> {
    /// Creates a collector scanning the globs of `config` (or the defaults).
    pub fn new(fs: F, config: &Lustre2Config) -> Self {
        Self {
            fs,
            ost_globs: config.effective_globs(TargetKind::Ost),
            mdt_globs: config.effective_globs(TargetKind::Mdt),
            last_timing: None,
        }
    }

    /// Globs scanned for `kind`.
    pub fn globs(&self, kind: TargetKind) -> &[String] {
        match kind {
            TargetKind::Ost => &self.ost_globs,
            TargetKind::Mdt => &self.mdt_globs,
        }
    }

    /// Timing of the last successful scan.
    pub fn last_timing(&self) -> Option<&ScanTiming> {
        self.last_timing.as_ref()
    }

    /// Runs one scan over all OST globs, then all MDT globs.
    ///
    /// Fails on the first error without producing any records.
    pub fn collect(&mut self) -> Result<Lustre2Snapshot, CollectError> {
        let start = Instant::now();
        let timestamp = Utc::now();
        let mut aggregator = StatAggregator::new();
        let mut timing = ScanTiming::default();

        for kind in [TargetKind::Ost, TargetKind::Mdt] {
            for pattern in self.globs(kind) {
                self.scan_glob(kind, pattern, &mut aggregator, &mut timing)?;
            }
        }

        let records = aggregator.drain();
        timing.records = records.len();
        timing.total = start.elapsed();
        debug!(
            "scan: {} files, {} lines, {} records in {:?}",
            timing.files, timing.lines, timing.records, timing.total
        );
        self.last_timing = Some(timing);

        Ok(Lustre2Snapshot { timestamp, records })
    }

    /// Runs one scan and hands every record to `sink`.
    ///
    /// Returns the number of records emitted.
    pub fn gather(&mut self, sink: &mut dyn MetricSink) -> Result<usize, CollectError> {
        let snapshot = self.collect()?;
        for record in &snapshot.records {
            sink.add_fields(MEASUREMENT, &record.fields, &record.tags, snapshot.timestamp)
                .map_err(CollectError::Sink)?;
        }
        sink.flush().map_err(CollectError::Sink)?;
        Ok(snapshot.records.len())
    }

    fn scan_glob(
        &self,
        kind: TargetKind,
        pattern: &str,
        aggregator: &mut StatAggregator,
        timing: &mut ScanTiming,
    ) -> Result<(), CollectError> {
        let files = self
            .fs
            .glob(pattern)
            .map_err(|source| CollectError::GlobSyntax {
                pattern: pattern.to_string(),
                source,
            })?;
        debug!("{} glob {}: {} files", kind.as_str(), pattern, files.len());

        for path in &files {
            self.scan_file(kind, path, aggregator, timing)?;
        }
        Ok(())
    }

    fn scan_file(
        &self,
        kind: TargetKind,
        path: &Path,
        aggregator: &mut StatAggregator,
        timing: &mut ScanTiming,
    ) -> Result<(), CollectError> {
        let target = resolve_target(path).map_err(|source| CollectError::UnresolvedTarget {
            path: path.to_path_buf(),
            source,
        })?;
        let variant = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(StatsVariant::from_file_name)
            .unwrap_or(StatsVariant::Plain);
        let rules = rules_for(kind, variant);
        let per_job = variant == StatsVariant::JobStats;

        let content = self
            .fs
            .read_to_string(path)
            .map_err(|source| CollectError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("reading {} ({:?}, target {})", path.display(), variant, target);

        aggregator.reset_job(target);
        for (idx, line) in content.lines().enumerate() {
            let parsed = parse_line(line, rules).map_err(|source| CollectError::MalformedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            aggregator
                .ingest(target, per_job, &parsed)
                .map_err(|source| CollectError::NumericConversion {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                })?;
            timing.lines += 1;
        }
        timing.files += 1;
        Ok(())
    }
}
