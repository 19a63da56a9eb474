//! ffprobe wrapper for the video tools.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe not found on PATH")]
    ToolNotFound,
    #[error("ffprobe failed: {0}")]
    ExecutionFailed(String),
    #[error("ffprobe output not understood: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

static FFPROBE: OnceLock<Option<PathBuf>> = OnceLock::new();

fn ffprobe_path() -> Option<&'static PathBuf> {
    FFPROBE.get_or_init(|| which::which("ffprobe").ok()).as_ref()
}

pub fn is_ffprobe_available() -> bool {
    ffprobe_path().is_some()
}

/// The subset of stream facts the encoders branch on.
#[derive(Debug, Clone)]
pub struct VideoProbe {
    pub codec: String,
    pub pix_fmt: String,
    pub bit_depth: u8,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

impl VideoProbe {
    /// True when the source needs a 10-bit encode path.
    pub fn is_high_bit_depth(&self) -> bool {
        self.bit_depth >= 10 || self.pix_fmt.contains("yuv420p10") || self.pix_fmt.contains("p010")
    }
}

/// Bit depth derived from the pixel format name.
pub fn detect_bit_depth(pix_fmt: &str) -> u8 {
    if pix_fmt.contains("12") {
        12
    } else if pix_fmt.contains("10") {
        10
    } else {
        8
    }
}

pub fn probe_video(path: &Path) -> Result<VideoProbe, ProbeError> {
    let tool = ffprobe_path().ok_or(ProbeError::ToolNotFound)?;

    let output = Command::new(tool)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "--",
        ])
        .arg(path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let msg = if stderr.trim().is_empty() {
            format!(
                "exit code {:?} for {}",
                output.status.code(),
                path.display()
            )
        } else {
            stderr.trim().to_string()
        };
        return Err(ProbeError::ExecutionFailed(msg));
    }

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| ProbeError::Parse(e.to_string()))?;

    let streams = json["streams"]
        .as_array()
        .ok_or_else(|| ProbeError::Parse("no streams array".to_string()))?;
    let video = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or_else(|| ProbeError::Parse("no video stream".to_string()))?;

    let codec = video["codec_name"].as_str().unwrap_or("unknown").to_string();
    let pix_fmt = video["pix_fmt"].as_str().unwrap_or("").to_string();
    let bit_depth = video["bits_per_raw_sample"]
        .as_str()
        .and_then(|s| s.parse::<u8>().ok())
        .unwrap_or_else(|| detect_bit_depth(&pix_fmt));
    let width = video["width"].as_u64().unwrap_or(0) as u32;
    let height = video["height"].as_u64().unwrap_or(0) as u32;
    let duration = json["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoProbe {
        codec,
        pix_fmt,
        bit_depth,
        width,
        height,
        duration,
    })
}
