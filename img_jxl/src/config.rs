//! Run configuration and file classification.

use crate::conflict::ConflictPolicy;
use std::collections::BTreeSet;
use std::path::Path;

/// Formats the pipeline converts to JPEG XL.
pub const CONVERT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "webp", "tiff", "tif", "heic", "heif", "jfif", "pjpeg", "pjp",
];

/// Recognized formats that are mirrored unchanged instead of converted.
pub const PASSTHROUGH_EXTENSIONS: &[&str] = &["svg", "gif", "ico", "psd", "pdf"];

/// The JPEG family gets the lossless transcode fast path.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jfif", "pjpeg", "pjp"];

pub const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

/// How low the quality search may step before accepting the result as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityFloor {
    /// 90: no search, single attempt.
    Default,
    /// 85
    Hq,
    /// 80
    Mq,
    /// 75
    Lq,
}

impl QualityFloor {
    pub fn floor(self) -> u8 {
        match self {
            QualityFloor::Default => 90,
            QualityFloor::Hq => 85,
            QualityFloor::Mq => 80,
            QualityFloor::Lq => 75,
        }
    }
}

/// Convertible image kinds; drives strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Heic,
    Raster,
}

/// What to do with one discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// User asked for this extension to be copied verbatim.
    ExplicitCopy,
    /// Recognized but unconvertible format; copied verbatim.
    Passthrough,
    Convert(ImageKind),
    /// Not a format this tool knows; ignored.
    Unknown,
}

/// Classify by extension. Explicit copy wins over everything so users can
/// exempt a convertible format from conversion.
pub fn classify(path: &Path, copy_extensions: &BTreeSet<String>) -> FileClass {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileClass::Unknown;
    };
    let ext = ext.to_ascii_lowercase();

    if copy_extensions.contains(&ext) {
        FileClass::ExplicitCopy
    } else if PASSTHROUGH_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Passthrough
    } else if JPEG_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Convert(ImageKind::Jpeg)
    } else if HEIC_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Convert(ImageKind::Heic)
    } else if CONVERT_EXTENSIONS.contains(&ext.as_str()) {
        FileClass::Convert(ImageKind::Raster)
    } else {
        FileClass::Unknown
    }
}

/// Accepts "raw", ".raw", "RAW" and stores the bare lowercase extension.
pub fn normalize_copy_extensions<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Immutable per-run settings, built once from the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Encoder effort, 1 (fast) to 9 (small).
    pub effort: u8,
    /// Persist encoder output even when it is not smaller than the source.
    pub force_output: bool,
    pub conflict: ConflictPolicy,
    pub floor: QualityFloor,
    pub copy_extensions: BTreeSet<String>,
    /// Thread hint injected into every encoder invocation.
    pub encoder_threads: usize,
    pub verbose: bool,
}

impl Config {
    pub fn quality_floor(&self) -> u8 {
        self.floor.floor()
    }
}
