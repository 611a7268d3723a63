//! Declarative extraction rules for Lustre statistics files.
//!
//! Lustre proc files change between versions, so what gets extracted is
//! described as data. Every rule names the first token of a line, the
//! whitespace-delimited column holding the value, and the field name the
//! value is reported as. All rules of a set are tried against every line; a
//! line can match several rules (e.g. `write_bytes` carries both the call
//! count and the byte total).

/// Which kind of Lustre target a statistics file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Object storage target (file data).
    Ost,
    /// Metadata target.
    Mdt,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Ost => "ost",
            TargetKind::Mdt => "mdt",
        }
    }
}

/// Which flavour of statistics file is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsVariant {
    /// Target-wide counters (`stats`, `md_stats`).
    Plain,
    /// Per-job counters (`job_stats`), grouped under `- job_id:` lines.
    JobStats,
}

impl StatsVariant {
    /// File name suffix that marks a per-job statistics file.
    pub const JOB_STATS_SUFFIX: &'static str = "job_stats";

    /// Infers the variant from a statistics file name.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(Self::JOB_STATS_SUFFIX) {
            StatsVariant::JobStats
        } else {
            StatsVariant::Plain
        }
    }
}

/// One line-prefix to field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    /// First token of the line (trailing `:` ignored).
    pub token: &'static str,
    /// Column holding the value. Column 0 is the token itself.
    pub field: usize,
    /// Field name the value is reported as.
    pub report_as: &'static str,
}

impl ExtractionRule {
    /// A counter reported under its own name, read from column 1.
    pub const fn counter(token: &'static str) -> Self {
        Self {
            token,
            field: 1,
            report_as: token,
        }
    }

    /// A value read from `field` and reported as `report_as`.
    ///
    /// Panics (at compile time for the static tables) if `field` is 0.
    pub const fn new(token: &'static str, field: usize, report_as: &'static str) -> Self {
        assert!(field != 0, "column 0 holds the line token, not a value");
        Self {
            token,
            field,
            report_as,
        }
    }
}

const fn rule(token: &'static str, field: usize, report_as: &'static str) -> ExtractionRule {
    ExtractionRule::new(token, field, report_as)
}

const fn counter(token: &'static str) -> ExtractionRule {
    ExtractionRule::counter(token)
}

/// `obdfilter/*/stats` and `osd-ldiskfs/*/stats`.
///
/// Format: `write_bytes 71893382 samples [bytes] 1 1048576 15201500833981`
/// where column 1 is the call count and column 6 the byte total.
pub static OST_STATS: &[ExtractionRule] = &[
    rule("write_bytes", 6, "write_bytes"),
    rule("write_bytes", 1, "write_calls"),
    rule("read_bytes", 6, "read_bytes"),
    rule("read_bytes", 1, "read_calls"),
    counter("cache_hit"),
    counter("cache_miss"),
    counter("cache_access"),
];

/// `obdfilter/*/job_stats`.
///
/// Format: `read_bytes: { samples: 1, unit: bytes, min: 4096, max: 4096, sum: 4096 }`.
/// Older releases label the byte counters `read`/`write`; both labels map to
/// the same field names.
pub static OST_JOB_STATS: &[ExtractionRule] = &[
    rule("read", 3, "jobstats_read_calls"),
    rule("read", 7, "jobstats_read_min_size"),
    rule("read", 9, "jobstats_read_max_size"),
    rule("read", 11, "jobstats_read_bytes"),
    rule("read_bytes", 3, "jobstats_read_calls"),
    rule("read_bytes", 7, "jobstats_read_min_size"),
    rule("read_bytes", 9, "jobstats_read_max_size"),
    rule("read_bytes", 11, "jobstats_read_bytes"),
    rule("write", 3, "jobstats_write_calls"),
    rule("write", 7, "jobstats_write_min_size"),
    rule("write", 9, "jobstats_write_max_size"),
    rule("write", 11, "jobstats_write_bytes"),
    rule("write_bytes", 3, "jobstats_write_calls"),
    rule("write_bytes", 7, "jobstats_write_min_size"),
    rule("write_bytes", 9, "jobstats_write_max_size"),
    rule("write_bytes", 11, "jobstats_write_bytes"),
    rule("getattr", 3, "jobstats_ost_getattr"),
    rule("setattr", 3, "jobstats_ost_setattr"),
    rule("punch", 3, "jobstats_punch"),
    rule("sync", 3, "jobstats_ost_sync"),
    rule("destroy", 3, "jobstats_destroy"),
    rule("create", 3, "jobstats_create"),
    rule("statfs", 3, "jobstats_ost_statfs"),
    rule("get_info", 3, "jobstats_get_info"),
    rule("set_info", 3, "jobstats_set_info"),
    rule("quotactl", 3, "jobstats_quotactl"),
];

/// `mdt/*/md_stats`. Format: `open 1024577037 samples [reqs]`.
pub static MDT_STATS: &[ExtractionRule] = &[
    counter("open"),
    counter("close"),
    counter("mknod"),
    counter("link"),
    counter("unlink"),
    counter("mkdir"),
    counter("rmdir"),
    counter("rename"),
    counter("getattr"),
    counter("setattr"),
    counter("getxattr"),
    counter("setxattr"),
    counter("statfs"),
    counter("sync"),
    counter("samedir_rename"),
    counter("crossdir_rename"),
];

/// `mdt/*/job_stats`. Format: `open: { samples: 5, unit: reqs }`.
pub static MDT_JOB_STATS: &[ExtractionRule] = &[
    rule("open", 3, "jobstats_open"),
    rule("close", 3, "jobstats_close"),
    rule("mknod", 3, "jobstats_mknod"),
    rule("link", 3, "jobstats_link"),
    rule("unlink", 3, "jobstats_unlink"),
    rule("mkdir", 3, "jobstats_mkdir"),
    rule("rmdir", 3, "jobstats_rmdir"),
    rule("rename", 3, "jobstats_rename"),
    rule("getattr", 3, "jobstats_getattr"),
    rule("setattr", 3, "jobstats_setattr"),
    rule("getxattr", 3, "jobstats_getxattr"),
    rule("setxattr", 3, "jobstats_setxattr"),
    rule("statfs", 3, "jobstats_statfs"),
    rule("sync", 3, "jobstats_sync"),
    rule("samedir_rename", 3, "jobstats_samedir_rename"),
    rule("crossdir_rename", 3, "jobstats_crossdir_rename"),
];

/// Returns the rule set for a target kind and file variant.
pub fn rules_for(kind: TargetKind, variant: StatsVariant) -> &'static [ExtractionRule] {
    match (kind, variant) {
        (TargetKind::Ost, StatsVariant::Plain) => OST_STATS,
        (TargetKind::Ost, StatsVariant::JobStats) => OST_JOB_STATS,
        (TargetKind::Mdt, StatsVariant::Plain) => MDT_STATS,
        (TargetKind::Mdt, StatsVariant::JobStats) => MDT_JOB_STATS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_sets() -> [&'static [ExtractionRule]; 4] {
        [OST_STATS, OST_JOB_STATS, MDT_STATS, MDT_JOB_STATS]
    }

    fn outputs_for(rules: &[ExtractionRule], token: &str) -> Vec<(usize, &'static str)> {
        rules
            .iter()
            .filter(|r| r.token == token)
            .map(|r| (r.field, r.report_as))
            .collect()
    }

    #[test]
    fn test_no_rule_reads_column_zero() {
        for rules in all_sets() {
            assert!(rules.iter().all(|r| r.field >= 1));
        }
    }

    #[test]
    fn test_counter_defaults() {
        let rule = ExtractionRule::counter("cache_hit");
        assert_eq!(rule.field, 1);
        assert_eq!(rule.report_as, "cache_hit");
    }

    #[test]
    #[should_panic(expected = "column 0")]
    fn test_column_zero_rejected() {
        let field = std::hint::black_box(0);
        let _ = ExtractionRule::new("open", field, "open");
    }

    #[test]
    fn test_ost_stats_byte_lines_yield_two_fields() {
        assert_eq!(
            outputs_for(OST_STATS, "write_bytes"),
            vec![(6, "write_bytes"), (1, "write_calls")]
        );
        assert_eq!(
            outputs_for(OST_STATS, "read_bytes"),
            vec![(6, "read_bytes"), (1, "read_calls")]
        );
    }

    #[test]
    fn test_job_stats_legacy_labels_match_new_labels() {
        assert_eq!(
            outputs_for(OST_JOB_STATS, "read"),
            outputs_for(OST_JOB_STATS, "read_bytes")
        );
        assert_eq!(
            outputs_for(OST_JOB_STATS, "write"),
            outputs_for(OST_JOB_STATS, "write_bytes")
        );
        assert_eq!(outputs_for(OST_JOB_STATS, "read").len(), 4);
    }

    #[test]
    fn test_mdt_job_stats_mirror_md_stats() {
        assert_eq!(MDT_STATS.len(), MDT_JOB_STATS.len());
        for (plain, job) in MDT_STATS.iter().zip(MDT_JOB_STATS) {
            assert_eq!(plain.token, job.token);
            assert_eq!(job.report_as, format!("jobstats_{}", plain.token));
        }
    }

    #[test]
    fn test_rules_for_selects_table() {
        assert_eq!(rules_for(TargetKind::Ost, StatsVariant::Plain), OST_STATS);
        assert_eq!(
            rules_for(TargetKind::Ost, StatsVariant::JobStats),
            OST_JOB_STATS
        );
        assert_eq!(rules_for(TargetKind::Mdt, StatsVariant::Plain), MDT_STATS);
        assert_eq!(
            rules_for(TargetKind::Mdt, StatsVariant::JobStats),
            MDT_JOB_STATS
        );
    }

    #[test]
    fn test_variant_from_file_name() {
        assert_eq!(StatsVariant::from_file_name("job_stats"), StatsVariant::JobStats);
        assert_eq!(StatsVariant::from_file_name("stats"), StatsVariant::Plain);
        assert_eq!(StatsVariant::from_file_name("md_stats"), StatsVariant::Plain);
    }
}
