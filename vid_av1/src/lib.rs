//! Video to AV1 conversion for single files or whole trees.
//!
//! Sources already in vp9 or av1 are copied verbatim; everything else is
//! re-encoded with `libsvtav1` into `.mkv` at a tier-selected preset/CRF
//! pair. Output is always 10-bit `yuv420p10le`, even for 8-bit sources.
//! Encodes run one at a time; a single SVT-AV1 instance already saturates
//! the CPU.

pub mod config;
pub mod encode;
pub mod pipeline;

pub use config::{is_smart_copy_codec, QualityTier, SMART_COPY_CODECS, VIDEO_EXTENSIONS};
pub use encode::{build_svtav1_args, encode_av1, is_ffmpeg_available, Av1Error};
pub use pipeline::{convert_video, Av1Outcome};
