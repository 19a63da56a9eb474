//! Best-effort metadata propagation onto freshly written outputs.
//!
//! Three layers: embedded tags via exiftool, Unix extended attributes, and
//! filesystem timestamps. All of it is advisory; failures are logged and
//! never escalate to the caller.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

static EXIFTOOL: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Resolved exiftool location, looked up once per process.
fn exiftool_path() -> Option<&'static PathBuf> {
    EXIFTOOL.get_or_init(|| which::which("exiftool").ok()).as_ref()
}

pub fn is_exiftool_available() -> bool {
    exiftool_path().is_some()
}

/// Copy all embedded tags from `src` onto `dst` in place.
fn copy_tags(src: &Path, dst: &Path) {
    let Some(tool) = exiftool_path() else {
        tracing::debug!("exiftool not found, skipping tag propagation");
        return;
    };

    let output = Command::new(tool)
        .arg("-overwrite_original")
        .arg("-TagsFromFile")
        .arg(src)
        .arg("-all:all")
        .arg("-ignoreMinorErrors")
        .arg(dst)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            tracing::debug!(dst = %dst.display(), "tags propagated");
        }
        Ok(out) => {
            tracing::warn!(
                dst = %dst.display(),
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "exiftool tag copy failed"
            );
        }
        Err(e) => {
            tracing::warn!(dst = %dst.display(), error = %e, "exiftool could not be run");
        }
    }
}

/// Mirror access and modification times from `src` onto `dst`.
pub fn copy_timestamps(src: &Path, dst: &Path) {
    let Ok(meta) = std::fs::metadata(src) else {
        return;
    };
    let atime = filetime::FileTime::from_last_access_time(&meta);
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    if let Err(e) = filetime::set_file_times(dst, atime, mtime) {
        tracing::warn!(dst = %dst.display(), error = %e, "failed to set file times");
    }
}

#[cfg(unix)]
fn copy_xattrs(src: &Path, dst: &Path) {
    if let Ok(names) = xattr::list(src) {
        for name in names {
            if let Ok(Some(value)) = xattr::get(src, &name) {
                let _ = xattr::set(dst, &name, &value);
            }
        }
    }
}

/// Propagate everything from `src` to `dst`. Timestamps go last because
/// exiftool rewrites `dst` and resets its mtime.
pub fn propagate(src: &Path, dst: &Path) {
    copy_tags(src, dst);
    #[cfg(unix)]
    copy_xattrs(src, dst);
    copy_timestamps(src, dst);
}
