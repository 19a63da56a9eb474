//! Video formats this tool enumerates and the codecs it will not touch.

/// Container extensions scanned in the source tree.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "mkv", "avi", "webm", "flv", "m4v", "mts", "m2ts", "3gp",
];

/// Codecs that are already at least as efficient as HEVC. Re-encoding
/// these would trade quality for nothing, so the original is copied.
pub const SMART_COPY_CODECS: &[&str] = &["vp9", "hevc", "h265", "av1"];

pub fn is_smart_copy_codec(codec: &str) -> bool {
    SMART_COPY_CODECS.contains(&codec.to_ascii_lowercase().as_str())
}
