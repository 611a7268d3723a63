//! Per-scan accumulation of extracted Lustre counters.
//!
//! Values are bucketed by `SourceKey`: the target name plus, for per-job
//! counters, the job identifier. Every job seen during a scan gets its own
//! bucket, so one target can drain into several records.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::parser::ParsedLine;
use crate::sink::Record;

/// Tag carrying the target name.
pub const TAG_NAME: &str = "name";
/// Tag carrying the job identifier of per-job records.
pub const TAG_JOBID: &str = "jobid";

/// Identifies one aggregation bucket.
///
/// Ordered by target, then the job-less bucket before job buckets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey {
    pub target: String,
    pub jobid: Option<String>,
}

impl SourceKey {
    pub fn target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            jobid: None,
        }
    }

    pub fn job(target: impl Into<String>, jobid: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            jobid: Some(jobid.into()),
        }
    }
}

/// Error raised when an extracted value is not an unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue {
    pub field: &'static str,
    pub value: String,
    /// Set when the value is all digits but does not fit in `u64`.
    pub source: Option<std::num::ParseIntError>,
}

impl InvalidValue {
    /// Parses a plain decimal counter: ASCII digits only, no sign.
    fn parse(field: &'static str, raw: &str) -> Result<u64, Self> {
        let invalid = |source| InvalidValue {
            field,
            value: raw.to_string(),
            source,
        };
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(None));
        }
        raw.parse::<u64>().map_err(|e| invalid(Some(e)))
    }
}

impl std::fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(e) => write!(
                f,
                "field '{}' has invalid value '{}': {}",
                self.field, self.value, e
            ),
            None => write!(
                f,
                "field '{}' has non-numeric value '{}'",
                self.field, self.value
            ),
        }
    }
}

impl std::error::Error for InvalidValue {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Accumulates counters of one scan.
///
/// Created empty for each scan, fed one parsed line at a time, then drained
/// into records.
#[derive(Debug, Default)]
pub struct StatAggregator {
    buckets: BTreeMap<SourceKey, BTreeMap<String, u64>>,
    /// Job most recently opened per target in the file being processed.
    current_job: HashMap<String, String>,
}

impl StatAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the current job of `target`.
    ///
    /// Called before each file so counters never inherit a job from a
    /// previous file.
    pub fn reset_job(&mut self, target: &str) {
        self.current_job.remove(target);
    }

    /// Folds one parsed line into the buckets of `target`.
    ///
    /// A job-id line switches the target's current job and opens its bucket.
    /// Field values are converted to `u64` and written to the current job's
    /// bucket for per-job files, or the target's job-less bucket otherwise.
    /// A later write to the same field replaces the earlier value.
    pub fn ingest(
        &mut self,
        target: &str,
        per_job: bool,
        parsed: &ParsedLine<'_>,
    ) -> Result<(), InvalidValue> {
        match parsed {
            ParsedLine::JobId(jobid) => {
                if let Some(previous) = self
                    .current_job
                    .insert(target.to_string(), jobid.to_string())
                {
                    debug!(target_name = target, "jobid changed from {} to {}", previous, jobid);
                }
                self.buckets
                    .entry(SourceKey::job(target, *jobid))
                    .or_default();
            }
            ParsedLine::Fields(pairs) if pairs.is_empty() => {}
            ParsedLine::Fields(pairs) => {
                let key = match self.current_job.get(target) {
                    Some(jobid) if per_job => SourceKey::job(target, jobid.as_str()),
                    _ => SourceKey::target(target),
                };
                let bucket = self.buckets.entry(key).or_default();
                for &(field, raw) in pairs {
                    let value = InvalidValue::parse(field, raw)?;
                    bucket.insert(field.to_string(), value);
                }
            }
        }
        Ok(())
    }

    /// Number of buckets opened so far.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Converts every bucket into a record and empties the aggregator.
    ///
    /// Records are tagged with `name` and, for job buckets, `jobid`.
    pub fn drain(&mut self) -> Vec<Record> {
        self.current_job.clear();
        std::mem::take(&mut self.buckets)
            .into_iter()
            .map(|(key, fields)| {
                let mut tags = BTreeMap::new();
                tags.insert(TAG_NAME.to_string(), key.target);
                if let Some(jobid) = key.jobid {
                    tags.insert(TAG_JOBID.to_string(), jobid);
                }
                Record { tags, fields }
            })
            .collect()
    }
}
