//! Collector configuration.
//!
//! The only knobs are the glob lists of statistics files per target kind.
//! Lustre proc files move between versions, so operators can point the
//! collector elsewhere; an empty list means the built-in Lustre 2.x defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::collector::lustre::mapping::TargetKind;

/// Default OST statistics files.
///
/// Read/write bytes are in `obdfilter/<ost>/stats`, cache counters in
/// `osd-ldiskfs/<ost>/stats`, per-job counters in `obdfilter/<ost>/job_stats`.
pub const DEFAULT_OST_PROCFILES: &[&str] = &[
    "/proc/fs/lustre/obdfilter/*/stats",
    "/proc/fs/lustre/osd-ldiskfs/*/stats",
    "/proc/fs/lustre/obdfilter/*/job_stats",
];

/// Default MDT statistics files: metadata server stats and per-job stats.
pub const DEFAULT_MDS_PROCFILES: &[&str] = &[
    "/proc/fs/lustre/mdt/*/md_stats",
    "/proc/fs/lustre/mdt/*/job_stats",
];

/// Annotated example configuration.
pub const SAMPLE_CONFIG: &str = r#"## An array of /proc globs to search for Lustre stats
## If not specified, the defaults work on Lustre 2.x
##
# ost_procfiles = [
#   "/proc/fs/lustre/obdfilter/*/stats",
#   "/proc/fs/lustre/osd-ldiskfs/*/stats",
#   "/proc/fs/lustre/obdfilter/*/job_stats",
# ]
# mds_procfiles = [
#   "/proc/fs/lustre/mdt/*/md_stats",
#   "/proc/fs/lustre/mdt/*/job_stats",
# ]
"#;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(PathBuf, std::io::Error),
    /// The configuration file is not valid TOML for this collector.
    Parse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "invalid config {}: {}", path.display(), e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
        }
    }
}

/// Glob lists of Lustre statistics files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Lustre2Config {
    /// OST statistics globs. Empty means `DEFAULT_OST_PROCFILES`.
    pub ost_procfiles: Vec<String>,
    /// MDT statistics globs. Empty means `DEFAULT_MDS_PROCFILES`.
    pub mds_procfiles: Vec<String>,
}

impl Lustre2Config {
    /// Parses a TOML configuration.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Globs to scan for `kind`: the configured list, or the defaults if the
    /// list is empty. The two are never merged.
    pub fn effective_globs(&self, kind: TargetKind) -> Vec<String> {
        let (configured, defaults) = match kind {
            TargetKind::Ost => (&self.ost_procfiles, DEFAULT_OST_PROCFILES),
            TargetKind::Mdt => (&self.mds_procfiles, DEFAULT_MDS_PROCFILES),
        };
        if configured.is_empty() {
            defaults.iter().map(|s| s.to_string()).collect()
        } else {
            configured.clone()
        }
    }
}
