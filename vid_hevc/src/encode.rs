//! ffmpeg NVENC invocation.

use shared_utils::ffprobe::{ProbeError, VideoProbe};
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
pub enum HevcError {
    #[error("required tool not found: {0}")]
    ToolNotFound(&'static str),

    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HevcError>;

/// Full NVENC argument list. Quality is fixed at CQ 18 with two-pass
/// lookahead and adaptive quantization; audio streams pass through
/// untouched.
pub fn build_nvenc_args(input: &Path, probe: &VideoProbe, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-threads".into(),
        "0".into(),
        "-hwaccel".into(),
        "cuda".into(),
        "-i".into(),
        input.display().to_string(),
        "-map_metadata".into(),
        "0".into(),
        "-c:v".into(),
        "hevc_nvenc".into(),
        "-preset".into(),
        "p7".into(),
        "-tier".into(),
        "high".into(),
        "-rc".into(),
        "vbr".into(),
        "-multipass".into(),
        "fullres".into(),
        "-cq:v".into(),
        "18".into(),
        "-b:v".into(),
        "0".into(),
        "-bf".into(),
        "3".into(),
        "-b_ref_mode".into(),
        "middle".into(),
        "-look_ahead".into(),
        "32".into(),
        "-spatial_aq".into(),
        "1".into(),
        "-temporal_aq".into(),
        "1".into(),
        "-aq-strength".into(),
        "10".into(),
    ];

    if probe.is_high_bit_depth() {
        args.extend([
            "-profile:v".into(),
            "main10".into(),
            "-pix_fmt".into(),
            "p010le".into(),
        ]);
    } else {
        args.extend(["-pix_fmt".into(), "yuv420p".into()]);
    }

    args.extend(["-c:a".into(), "copy".into()]);
    args.push(output.display().to_string());
    args
}

/// Encode `input` to HEVC at `output`, returning the output size.
/// A failed run never leaves a partial file behind.
pub fn encode_hevc(input: &Path, probe: &VideoProbe, output: &Path) -> Result<u64> {
    let ffmpeg = ffmpeg_path().ok_or(HevcError::ToolNotFound("ffmpeg"))?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let args = build_nvenc_args(input, probe, output);
    tracing::debug!(input = %input.display(), "running ffmpeg hevc_nvenc");
    let result = Command::new(ffmpeg).args(&args).output()?;

    if !result.status.success() {
        let _ = std::fs::remove_file(output);
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(HevcError::Ffmpeg(
            stderr.lines().rev().take(4).collect::<Vec<_>>().join(" | "),
        ));
    }

    Ok(std::fs::metadata(output)?.len())
}
