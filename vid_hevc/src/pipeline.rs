//! Per-file decision chain: stale cleanup, skip checks, codec probe,
//! then smart copy or NVENC re-encode.

use crate::config::is_smart_copy_codec;
use crate::encode::{encode_hevc, HevcError};
use console::style;
use shared_utils::ffprobe::probe_video;
use shared_utils::{copier, metadata};
use std::path::Path;

#[derive(Debug)]
pub enum VideoOutcome {
    /// Re-encoded to HEVC; the destination carries a `.mkv` extension.
    Encoded { src_size: u64, out_size: u64 },
    /// Source codec is already efficient; copied verbatim.
    Copied { codec: String },
    /// A finished output from an earlier run is already in place.
    Skipped,
    Failed { error: HevcError },
}

impl VideoOutcome {
    pub fn delta_percent(&self) -> Option<f64> {
        match self {
            VideoOutcome::Encoded { src_size, out_size } if *src_size > 0 => {
                Some((*src_size as f64 - *out_size as f64) / *src_size as f64 * 100.0)
            }
            VideoOutcome::Encoded { .. } => Some(0.0),
            _ => None,
        }
    }

    pub fn status_line(&self, name: &str) -> String {
        match self {
            VideoOutcome::Encoded { .. } => format!(
                "{} {} ({:+.1}%) [HEVC-NVENC]",
                style("[OK]").green().bold(),
                name,
                self.delta_percent().unwrap_or(0.0)
            ),
            VideoOutcome::Copied { codec } => {
                format!("{} {} (already {})", style("[COPY]").cyan(), name, codec)
            }
            VideoOutcome::Skipped => {
                format!("{} {} (already exists)", style("[SKIP]").dim(), name)
            }
            VideoOutcome::Failed { error } => {
                format!("{} {}: {}", style("[ERROR]").red().bold(), name, error)
            }
        }
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

fn try_process(input: &Path, src_root: &Path, dst_root: &Path) -> Result<VideoOutcome, HevcError> {
    let dst_mkv = copier::mirror_path_with_extension(input, src_root, dst_root, "mkv")?;
    let dst_copy = copier::mirror_path(input, src_root, dst_root)?;

    clean_stale(&dst_mkv)?;
    clean_stale(&dst_copy)?;

    // Either shape of finished output counts: the re-encoded .mkv or a
    // smart-copied original.
    if dst_mkv.exists() || dst_copy.exists() {
        return Ok(VideoOutcome::Skipped);
    }

    let src_size = std::fs::metadata(input)?.len();
    let probe = probe_video(input)?;

    if is_smart_copy_codec(&probe.codec) {
        copier::retain_original(input, src_root, dst_root)?;
        metadata::copy_timestamps(input, &dst_copy);
        return Ok(VideoOutcome::Copied { codec: probe.codec });
    }

    let out_size = encode_hevc(input, &probe, &dst_mkv)?;
    metadata::copy_timestamps(input, &dst_mkv);

    Ok(VideoOutcome::Encoded { src_size, out_size })
}

/// Process one file; failures are folded into the outcome so the batch
/// continues.
pub fn process_file(input: &Path, src_root: &Path, dst_root: &Path) -> VideoOutcome {
    match try_process(input, src_root, dst_root) {
        Ok(outcome) => outcome,
        Err(error) => VideoOutcome::Failed { error },
    }
}
