//! Video formats this tool enumerates and the encoder quality tiers.

use clap::ValueEnum;

/// Container extensions scanned in the source tree.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "mkv", "avi", "webm", "flv", "m4v", "mts", "m2ts", "3gp",
];

/// Codecs copied verbatim instead of re-encoded. The bar is higher than
/// for the HEVC tool: hevc sources still get transcoded to AV1.
pub const SMART_COPY_CODECS: &[&str] = &["vp9", "av1"];

pub fn is_smart_copy_codec(codec: &str) -> bool {
    SMART_COPY_CODECS.contains(&codec.to_ascii_lowercase().as_str())
}

/// SVT-AV1 quality tier. Each tier pins a preset/CRF pair; lower preset
/// numbers are slower and keep more detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QualityTier {
    /// Slow archival encode that retains grain.
    Hq,
    /// Balanced speed and size.
    Mq,
    /// Fast and small.
    Lq,
}

impl QualityTier {
    /// Value passed to `-preset` (SVT-AV1 scale 0-13).
    pub fn preset(self) -> u8 {
        match self {
            QualityTier::Hq => 3,
            QualityTier::Mq => 8,
            QualityTier::Lq => 9,
        }
    }

    /// Value passed to `-crf`.
    pub fn crf(self) -> u8 {
        match self {
            QualityTier::Hq => 26,
            QualityTier::Mq => 28,
            QualityTier::Lq => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Hq => "hq",
            QualityTier::Mq => "mq",
            QualityTier::Lq => "lq",
        }
    }
}
