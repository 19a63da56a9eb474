//! Per-target decision chain: in-place guard, stale cleanup, skip checks,
//! codec probe, then smart copy or SVT-AV1 re-encode.
//!
//! Unlike the tree-mirroring HEVC tool, every call here gets an explicit
//! output path; the binary decides whether that came from a single-file
//! invocation or a directory walk.

use crate::config::{is_smart_copy_codec, QualityTier};
use crate::encode::{encode_av1, Av1Error};
use console::style;
use shared_utils::ffprobe::probe_video;
use shared_utils::metadata;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Av1Outcome {
    /// Re-encoded with SVT-AV1 into the requested output.
    Encoded { src_size: u64, out_size: u64 },
    /// Source codec is already AV1-class; copied verbatim next to the
    /// requested output, keeping its original extension.
    Copied { codec: String },
    /// Source codec is already AV1-class and the copy target resolves to
    /// the input itself, so there is nothing to write.
    AlreadyModern { codec: String },
    /// A finished output from an earlier run is already in place.
    Skipped,
    Failed { error: Av1Error },
}

impl Av1Outcome {
    pub fn delta_percent(&self) -> Option<f64> {
        match self {
            Av1Outcome::Encoded { src_size, out_size } if *src_size > 0 => {
                Some((*src_size as f64 - *out_size as f64) / *src_size as f64 * 100.0)
            }
            Av1Outcome::Encoded { .. } => Some(0.0),
            _ => None,
        }
    }

    pub fn status_line(&self, name: &str) -> String {
        match self {
            Av1Outcome::Encoded { .. } => format!(
                "{} {} ({:+.1}%) [SVT-AV1]",
                style("[OK]").green().bold(),
                name,
                self.delta_percent().unwrap_or(0.0)
            ),
            Av1Outcome::Copied { codec } => {
                format!("{} {} (already {})", style("[COPY]").cyan(), name, codec)
            }
            Av1Outcome::AlreadyModern { codec } => format!(
                "{} {} (already {}, in place)",
                style("[SKIP]").dim(),
                name,
                codec
            ),
            Av1Outcome::Skipped => {
                format!("{} {} (already exists)", style("[SKIP]").dim(), name)
            }
            Av1Outcome::Failed { error } => {
                format!("{} {}: {}", style("[ERROR]").red().bold(), name, error)
            }
        }
    }
}

/// Where a smart copy of `input` would land: the requested output path
/// with the input's own extension.
fn smart_copy_target(input: &Path, output: &Path) -> PathBuf {
    output.with_extension(input.extension().unwrap_or(OsStr::new("")))
}

/// Path equality that survives symlinks and relative spellings. A path
/// that does not exist cannot be the same file as one that does.
fn is_same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Delete `path` if it is a zero-byte leftover from an interrupted run.
fn clean_stale(path: &Path) -> std::io::Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => {
            tracing::debug!("removing stale zero-byte output {}", path.display());
            std::fs::remove_file(path)
        }
        _ => Ok(()),
    }
}

fn try_convert(input: &Path, output: &Path, tier: QualityTier) -> Result<Av1Outcome, Av1Error> {
    // An output resolving to the input itself cannot be written safely;
    // the input stays untouched, stale cleanup included.
    if is_same_path(output, input) {
        return Ok(Av1Outcome::Skipped);
    }

    let copy_target = smart_copy_target(input, output);
    let copy_is_input = is_same_path(&copy_target, input);

    clean_stale(output)?;
    if !copy_is_input {
        clean_stale(&copy_target)?;
    }

    // Either shape of finished output counts: the re-encoded .mkv or a
    // smart-copied original.
    if output.exists() || (!copy_is_input && copy_target.exists()) {
        return Ok(Av1Outcome::Skipped);
    }

    let src_size = std::fs::metadata(input)?.len();
    let probe = probe_video(input)?;

    if is_smart_copy_codec(&probe.codec) {
        if copy_is_input {
            return Ok(Av1Outcome::AlreadyModern { codec: probe.codec });
        }
        if let Some(parent) = copy_target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(input, &copy_target)?;
        metadata::copy_timestamps(input, &copy_target);
        return Ok(Av1Outcome::Copied { codec: probe.codec });
    }

    let out_size = encode_av1(input, tier, output)?;
    metadata::copy_timestamps(input, output);

    Ok(Av1Outcome::Encoded { src_size, out_size })
}

/// Convert one file to the given output path; failures are folded into
/// the outcome so a batch caller can keep going.
pub fn convert_video(input: &Path, output: &Path, tier: QualityTier) -> Av1Outcome {
    match try_convert(input, output, tier) {
        Ok(outcome) => outcome,
        Err(error) => Av1Outcome::Failed { error },
    }
}
