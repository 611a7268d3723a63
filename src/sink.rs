//! Metric records and the sinks that emit them.
//!
//! A scan produces one `Record` per aggregation bucket. Sinks receive
//! records one at a time as `(measurement, fields, tags, timestamp)`.

use std::collections::BTreeMap;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Measurement name of every emitted record.
pub const MEASUREMENT: &str = "lustre2";

/// One tagged measurement: target name, optional job identifier and counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, u64>,
}

impl Record {
    /// Returns the value of a tag, if present.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Returns the value of a field, if present.
    pub fn field(&self, key: &str) -> Option<u64> {
        self.fields.get(key).copied()
    }
}

/// Receiver of emitted records.
pub trait MetricSink {
    /// Accepts one record.
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &BTreeMap<String, u64>,
        tags: &BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> io::Result<()>;

    /// Flushes buffered output. Called once after all records of a scan.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A record kept by `MemorySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub measurement: String,
    pub record: Record,
    pub timestamp: DateTime<Utc>,
}

/// Keeps records in memory. Used by tests and embedders.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<StoredRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricSink for MemorySink {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &BTreeMap<String, u64>,
        tags: &BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> io::Result<()> {
        self.records.push(StoredRecord {
            measurement: measurement.to_string(),
            record: Record {
                tags: tags.clone(),
                fields: fields.clone(),
            },
            timestamp,
        });
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    measurement: &'a str,
    timestamp: i64,
    tags: &'a BTreeMap<String, String>,
    fields: &'a BTreeMap<String, u64>,
}

/// Writes one JSON object per record and line.
///
/// `timestamp` is in milliseconds since the Unix epoch.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MetricSink for JsonSink<W> {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &BTreeMap<String, u64>,
        tags: &BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> io::Result<()> {
        let json = JsonRecord {
            measurement,
            timestamp: timestamp.timestamp_millis(),
            tags,
            fields,
        };
        serde_json::to_writer(&mut self.out, &json)?;
        self.out.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Writes InfluxDB line protocol.
///
/// Fields are written as unsigned integers (`u` suffix), the timestamp in
/// nanoseconds. Records without fields cannot be expressed and are skipped.
pub struct LineProtocolSink<W: Write> {
    out: W,
}

impl<W: Write> LineProtocolSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Escapes `,`, `=` and spaces in tag keys, tag values and field keys.
fn escape_key(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, ',' | '=' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes `,` and spaces in measurement names.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

impl<W: Write> MetricSink for LineProtocolSink<W> {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &BTreeMap<String, u64>,
        tags: &BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> io::Result<()> {
        if fields.is_empty() {
            debug!("skipping {} record without fields: {:?}", measurement, tags);
            return Ok(());
        }

        let mut line = escape_measurement(measurement);
        for (key, value) in tags {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        let fields: Vec<String> = fields
            .iter()
            .map(|(key, value)| format!("{}={}u", escape_key(key), value))
            .collect();
        line.push(' ');
        line.push_str(&fields.join(","));

        if let Some(nanos) = timestamp.timestamp_nanos_opt() {
            line.push(' ');
            line.push_str(&nanos.to_string());
        }

        writeln!(self.out, "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
