//! Strategy selection for one encode attempt.
//!
//! The choice is a pure function of the file's kind and the quality being
//! attempted, so the search loop can re-plan cheaply at every step.

use crate::config::ImageKind;

/// One way to get source pixels into cjxl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Bit-exact JPEG transcode (`--lossless_jpeg=1`). Only meaningful for
    /// JPEG sources at the initial quality.
    LosslessTranscode,
    /// Feed the source file to cjxl directly at a quality setting.
    QualityReencode,
    /// Decode ourselves, hand cjxl a PNG over stdin. The only route for
    /// HEIC and the rescue route when direct invocation fails.
    FallbackDecodeEncode,
}

/// Ordered candidates for one attempt. Earlier entries are tried first;
/// a failed candidate falls through to the next.
pub fn strategies_for(kind: ImageKind, quality: u8) -> &'static [Strategy] {
    match kind {
        ImageKind::Heic => &[Strategy::FallbackDecodeEncode],
        ImageKind::Jpeg if quality == 90 => {
            &[Strategy::LosslessTranscode, Strategy::QualityReencode]
        }
        ImageKind::Jpeg => &[Strategy::QualityReencode],
        ImageKind::Raster => &[Strategy::QualityReencode],
    }
}
