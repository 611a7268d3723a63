//! Parsers for Lustre statistics lines.
//!
//! These are pure functions over string input so they can be tested without
//! any filesystem.

use std::path::Path;

use super::mapping::ExtractionRule;

/// Prefix of the line that opens a block of per-job counters.
pub const JOB_ID_PREFIX: &str = "- job_id:";

/// Error type for malformed statistics lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line matched a rule but has no column at the rule's index.
    MissingField {
        token: String,
        field: usize,
        columns: usize,
    },
    /// A `- job_id:` line without the job identifier.
    MissingJobId,
    /// A statistics file path without a parent directory to name the target.
    NoTarget(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingField {
                token,
                field,
                columns,
            } => write!(
                f,
                "'{}' line has {} columns, value expected in column {}",
                token, columns, field
            ),
            ParseError::MissingJobId => write!(f, "job_id line without a job identifier"),
            ParseError::NoTarget(path) => write!(f, "cannot derive target name from '{}'", path),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result of parsing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// The line opens a new job block.
    JobId(&'a str),
    /// `(field name, raw value)` pairs, in rule order. Empty if no rule matched.
    Fields(Vec<(&'static str, &'a str)>),
}

impl ParsedLine<'_> {
    /// Returns `true` if the line yielded nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, ParsedLine::Fields(fields) if fields.is_empty())
    }
}

/// Parses one statistics line against a rule set.
///
/// A `- job_id:` line yields its third column as the job identifier. Any other
/// line yields one pair per rule whose token equals the first column (with a
/// trailing `:` removed); the value has a trailing `,` removed. Lines matching
/// no rule, including blank lines, yield an empty field list.
pub fn parse_line<'a>(
    line: &'a str,
    rules: &[ExtractionRule],
) -> Result<ParsedLine<'a>, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if line.starts_with(JOB_ID_PREFIX) {
        return parts
            .get(2)
            .copied()
            .map(ParsedLine::JobId)
            .ok_or(ParseError::MissingJobId);
    }

    let Some(first) = parts.first().copied() else {
        return Ok(ParsedLine::Fields(Vec::new()));
    };
    let token = first.strip_suffix(':').unwrap_or(first);

    let mut fields = Vec::new();
    for rule in rules.iter().filter(|r| r.token == token) {
        let value = parts
            .get(rule.field)
            .copied()
            .ok_or_else(|| ParseError::MissingField {
                token: token.to_string(),
                field: rule.field,
                columns: parts.len(),
            })?;
        fields.push((rule.report_as, value.strip_suffix(',').unwrap_or(value)));
    }

    Ok(ParsedLine::Fields(fields))
}

/// Derives the target name from a statistics file path.
///
/// Turns `/proc/fs/lustre/obdfilter/<target>/stats` and similar into
/// `<target>`: the directory immediately containing the file.
pub fn resolve_target(path: &Path) -> Result<&str, ParseError> {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::NoTarget(path.display().to_string()))
}
