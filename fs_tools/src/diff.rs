//! Extension-blind comparison of two directory trees.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Relative path with the extension removed, mapped to every extension
/// that path was found with (dotted, lowercased; empty for none).
pub type TreeIndex = BTreeMap<PathBuf, BTreeSet<String>>;

pub fn index_tree(root: &Path) -> TreeIndex {
    let mut index = TreeIndex::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let ext = match entry.path().extension() {
            Some(e) => format!(".{}", e.to_string_lossy().to_ascii_lowercase()),
            None => String::new(),
        };
        index.entry(rel.with_extension("")).or_default().insert(ext);
    }
    tracing::debug!(root = %root.display(), entries = index.len(), "indexed tree");
    index
}

/// Entries present on one side only, with the extensions they were found
/// under there. Sorted by relative path.
#[derive(Debug, Default)]
pub struct TreeDiff {
    pub missing_in_right: Vec<(PathBuf, BTreeSet<String>)>,
    pub missing_in_left: Vec<(PathBuf, BTreeSet<String>)>,
}

impl TreeDiff {
    pub fn is_match(&self) -> bool {
        self.missing_in_right.is_empty() && self.missing_in_left.is_empty()
    }
}

pub fn diff_trees(left: &TreeIndex, right: &TreeIndex) -> TreeDiff {
    let missing_in_right = left
        .iter()
        .filter(|(key, _)| !right.contains_key(*key))
        .map(|(key, exts)| (key.clone(), exts.clone()))
        .collect();
    let missing_in_left = right
        .iter()
        .filter(|(key, _)| !left.contains_key(*key))
        .map(|(key, exts)| (key.clone(), exts.clone()))
        .collect();
    TreeDiff {
        missing_in_right,
        missing_in_left,
    }
}
