//! Batch video to HEVC conversion.
//!
//! Walks a source tree and mirrors it: sources in modern codecs (vp9,
//! hevc, av1) are copied verbatim, everything else is re-encoded with
//! `hevc_nvenc` into `.mkv`. Encodes run one at a time; the GPU is the
//! bottleneck, not the walk.

pub mod config;
pub mod encode;
pub mod pipeline;

pub use config::{is_smart_copy_codec, SMART_COPY_CODECS, VIDEO_EXTENSIONS};
pub use encode::{build_nvenc_args, encode_hevc, is_ffmpeg_available, HevcError};
pub use pipeline::{process_file, VideoOutcome};
