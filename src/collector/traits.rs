//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to work with both the real
//! Lustre `/proc` tree on a server and in-memory implementations for testing
//! on machines without Lustre.

use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, PatternError};
use tracing::debug;

/// Match options shared by every `FileSystem` implementation.
///
/// `*` and `?` never match a path separator, so `/proc/fs/lustre/mdt/*/md_stats`
/// only sees direct children of `mdt`.
pub const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    ///
    /// # Returns
    /// The file contents as a string, or an I/O error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists files matching a glob pattern.
    ///
    /// # Arguments
    /// * `pattern` - Shell-style glob, e.g. `/proc/fs/lustre/obdfilter/*/stats`
    ///
    /// # Returns
    /// Matching paths in sorted order (possibly empty), or a pattern error if
    /// `pattern` is not a valid glob.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, PatternError>;
}

/// Real filesystem implementation that delegates to `std::fs` and `glob`.
///
/// Use this in production to read from the actual `/proc/fs/lustre` tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
        let mut paths = Vec::new();
        for entry in glob::glob_with(pattern, GLOB_OPTIONS)? {
            match entry {
                Ok(path) => paths.push(path),
                // Directories we cannot descend into simply do not match.
                Err(e) => debug!("skipping unreadable glob entry: {}", e),
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("stats");
        fs::write(&stats, "cache_hit 42 samples [pages] 1 1 42\n").unwrap();

        let content = RealFs::new().read_to_string(&stats).unwrap();
        assert!(content.starts_with("cache_hit 42"));
    }

    #[test]
    fn test_real_fs_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RealFs::new().read_to_string(&dir.path().join("missing"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_real_fs_glob_sorted_and_single_level() {
        let dir = tempfile::tempdir().unwrap();
        for target in ["fs-OST0001", "fs-OST0000"] {
            let target_dir = dir.path().join(target);
            fs::create_dir_all(target_dir.join("nested")).unwrap();
            fs::write(target_dir.join("stats"), "").unwrap();
            fs::write(target_dir.join("nested").join("stats"), "").unwrap();
        }

        let pattern = format!("{}/*/stats", dir.path().display());
        let paths = RealFs::new().glob(&pattern).unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join("fs-OST0000").join("stats"),
                dir.path().join("fs-OST0001").join("stats"),
            ]
        );
    }

    #[test]
    fn test_real_fs_glob_no_match_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*/job_stats", dir.path().display());
        assert!(RealFs::new().glob(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_real_fs_glob_invalid_pattern() {
        assert!(RealFs::new().glob("/proc/fs/lustre/[obdfilter/*/stats").is_err());
    }
}
