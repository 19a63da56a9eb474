//! Verbatim retention of source files in the destination tree.

use std::io;
use std::path::{Path, PathBuf};

/// Destination path for `input` mirrored from `src_root` into `dst_root`,
/// keeping the original file name.
pub fn mirror_path(input: &Path, src_root: &Path, dst_root: &Path) -> io::Result<PathBuf> {
    let rel = input.strip_prefix(src_root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not under {}", input.display(), src_root.display()),
        )
    })?;
    Ok(dst_root.join(rel))
}

/// Same as [`mirror_path`] but with the file extension swapped.
pub fn mirror_path_with_extension(
    input: &Path,
    src_root: &Path,
    dst_root: &Path,
    extension: &str,
) -> io::Result<PathBuf> {
    Ok(mirror_path(input, src_root, dst_root)?.with_extension(extension))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainStatus {
    Copied,
    AlreadyExists,
}

/// Copy `input` unchanged to its mirrored destination path. Never overwrites;
/// an existing destination leaves the file untouched.
pub fn retain_original(
    input: &Path,
    src_root: &Path,
    dst_root: &Path,
) -> io::Result<RetainStatus> {
    let dest = mirror_path(input, src_root, dst_root)?;
    if dest.exists() {
        tracing::debug!(dest = %dest.display(), "retention target already exists");
        return Ok(RetainStatus::AlreadyExists);
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(input, &dest)?;
    tracing::debug!(src = %input.display(), dest = %dest.display(), "original retained");
    Ok(RetainStatus::Copied)
}
