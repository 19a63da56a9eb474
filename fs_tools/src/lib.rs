//! Housekeeping for converted media trees.
//!
//! After a batch conversion the source tree tends to accumulate pairs
//! like `photo.jpg` next to `photo.jxl`. `dedupe-keep` removes the
//! originals once a kept-format sibling exists; `tree-diff` checks two
//! trees for the same files by relative path, ignoring extensions.

pub mod dedupe;
pub mod diff;

pub use dedupe::{find_redundant, normalize_keep_extension};
pub use diff::{diff_trees, index_tree, TreeDiff, TreeIndex};
