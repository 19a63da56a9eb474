//! Per-directory duplicate cleanup around a kept extension.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Accepts ".jxl", "JXL" or "jxl" alike; stored without the dot,
/// lowercased.
pub fn normalize_keep_extension(raw: &str) -> String {
    raw.trim_start_matches('.').to_ascii_lowercase()
}

/// Files shadowed by a same-stem sibling carrying the kept extension.
///
/// Grouping is per directory: `a/photo.jpg` and `b/photo.jxl` never
/// shadow each other. A group with nothing but kept copies is left
/// alone. Returned paths are sorted.
pub fn find_redundant(root: &Path, keep_ext: &str) -> Vec<PathBuf> {
    let keep = normalize_keep_extension(keep_ext);

    let mut groups: BTreeMap<(PathBuf, OsString), Vec<(PathBuf, String)>> = BTreeMap::new();
    let mut scanned = 0usize;
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let (Some(parent), Some(stem)) = (path.parent(), path.file_stem()) else {
            continue;
        };
        let key = (parent.to_path_buf(), stem.to_os_string());
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        groups.entry(key).or_default().push((path.clone(), ext));
        scanned += 1;
    }
    tracing::debug!(scanned, stems = groups.len(), "grouped files by directory and stem");

    let mut redundant = Vec::new();
    for members in groups.into_values() {
        if members.len() < 2 || !members.iter().any(|(_, ext)| *ext == keep) {
            continue;
        }
        for (path, ext) in members {
            if ext != keep {
                redundant.push(path);
            }
        }
    }
    redundant.sort();
    redundant
}
