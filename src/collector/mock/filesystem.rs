//! In-memory mock filesystem for testing collectors without a Lustre server.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on any machine and in CI environments.

use crate::collector::traits::{FileSystem, GLOB_OPTIONS};
use glob::{Pattern, PatternError};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores file contents keyed by path, allowing tests to simulate various
/// `/proc/fs/lustre` layouts without needing a real server.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: BTreeMap<PathBuf, String>,
    /// Paths that exist but fail to read.
    unreadable: BTreeMap<PathBuf, io::ErrorKind>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.unreadable.remove(&path);
        self.files.insert(path, content.into());
    }

    /// Adds a file that shows up in glob listings but fails to read with `kind`.
    ///
    /// Simulates a target that disappears between listing and reading, or a
    /// file the collector has no permission for.
    pub fn add_unreadable(&mut self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let path = path.as_ref().to_path_buf();
        self.files.remove(&path);
        self.unreadable.insert(path, kind);
    }

    /// Adds one Lustre target directory with its statistics files.
    ///
    /// # Arguments
    /// * `kind_dir` - Directory under `/proc/fs/lustre`, e.g. `obdfilter` or `mdt`
    /// * `target` - Target name, e.g. `fs-OST0000`
    /// * `files` - `(file name, content)` pairs placed inside the target directory
    pub fn add_target(&mut self, kind_dir: &str, target: &str, files: &[(&str, &str)]) {
        let base = PathBuf::from(format!("/proc/fs/lustre/{}/{}", kind_dir, target));
        for (name, content) in files {
            self.add_file(base.join(name), *content);
        }
    }

    /// Number of files (readable or not) known to the mock.
    pub fn len(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }

    /// Returns `true` if no files were added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if let Some(kind) = self.unreadable.get(path) {
            return Err(io::Error::new(
                *kind,
                format!("cannot read {:?}", path),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
        let pattern = Pattern::new(pattern)?;
        let mut paths: Vec<PathBuf> = self
            .files
            .keys()
            .chain(self.unreadable.keys())
            .filter(|path| pattern.matches_path_with(path, GLOB_OPTIONS))
            .cloned()
            .collect();
        paths.sort();
        Ok(paths)
    }
}
