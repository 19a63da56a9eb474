//! Batch enumeration and per-run outcome accounting.
//!
//! Every tool walks its source tree up front, processes the files, and folds
//! the per-file outcomes into a [`BatchResult`] for the summary report.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Case-insensitive extension match against a lowercase list.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collect matching files under `dir`, sorted by path so runs are
/// deterministic and output ordering is stable across machines.
pub fn collect_files(dir: &Path, extensions: &[&str], recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Per-run tally of the outcome surface: converted, force-persisted,
/// copied verbatim, skipped, failed.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total: usize,
    pub converted: usize,
    pub forced: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self {
            total: 0,
            converted: 0,
            forced: 0,
            copied: 0,
            skipped: 0,
            failed: 0,
            bytes_in: 0,
            bytes_out: 0,
            errors: Vec::new(),
        }
    }

    pub fn converted(&mut self, bytes_in: u64, bytes_out: u64) {
        self.total += 1;
        self.converted += 1;
        self.bytes_in += bytes_in;
        self.bytes_out += bytes_out;
    }

    pub fn forced(&mut self, bytes_in: u64, bytes_out: u64) {
        self.total += 1;
        self.forced += 1;
        self.bytes_in += bytes_in;
        self.bytes_out += bytes_out;
    }

    pub fn copied(&mut self) {
        self.total += 1;
        self.copied += 1;
    }

    pub fn skipped(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn failed(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    /// Share of files that ended in a non-error state.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            ((self.total - self.failed) as f64 / self.total as f64) * 100.0
        }
    }

    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}
