//! ffmpeg SVT-AV1 invocation.

use crate::config::QualityTier;
use shared_utils::ffprobe::ProbeError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

static FFMPEG: OnceLock<Option<PathBuf>> = OnceLock::new();

fn ffmpeg_path() -> Option<&'static Path> {
    FFMPEG.get_or_init(|| which::which("ffmpeg").ok()).as_deref()
}

pub fn is_ffmpeg_available() -> bool {
    ffmpeg_path().is_some()
}

#[derive(Debug, thiserror::Error)]
pub enum Av1Error {
    #[error("required tool not found: {0}")]
    ToolNotFound(&'static str),

    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Av1Error>;

/// Full SVT-AV1 argument list. Only the preset/CRF pair varies with the
/// tier; output is always 10-bit `yuv420p10le` regardless of source
/// depth, and audio streams pass through untouched.
pub fn build_svtav1_args(input: &Path, tier: QualityTier, output: &Path) -> Vec<String> {
    vec![
        "-threads".into(),
        "0".into(),
        "-i".into(),
        input.display().to_string(),
        "-map_metadata".into(),
        "0".into(),
        "-c:v".into(),
        "libsvtav1".into(),
        "-preset".into(),
        tier.preset().to_string(),
        "-crf".into(),
        tier.crf().to_string(),
        "-g".into(),
        "240".into(),
        "-pix_fmt".into(),
        "yuv420p10le".into(),
        "-c:a".into(),
        "copy".into(),
        output.display().to_string(),
    ]
}

/// Encode `input` to AV1 at `output`, returning the output size.
/// A failed run never leaves a partial file behind.
pub fn encode_av1(input: &Path, tier: QualityTier, output: &Path) -> Result<u64> {
    let ffmpeg = ffmpeg_path().ok_or(Av1Error::ToolNotFound("ffmpeg"))?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let args = build_svtav1_args(input, tier, output);
    tracing::debug!(
        input = %input.display(),
        tier = tier.label(),
        "running ffmpeg libsvtav1"
    );
    let result = Command::new(ffmpeg).args(&args).output()?;

    if !result.status.success() {
        let _ = std::fs::remove_file(output);
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(Av1Error::Ffmpeg(
            stderr.lines().rev().take(4).collect::<Vec<_>>().join(" | "),
        ));
    }

    Ok(std::fs::metadata(output)?.len())
}
