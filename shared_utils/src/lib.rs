//! Shared utilities for the media-shrink tools
//!
//! Common functionality used by img-jxl, vid-hevc, vid-av1 and the fs tools:
//! - Batch enumeration and outcome accounting
//! - Progress bar with suspend-aware status printing
//! - Summary reporting
//! - Logging setup (stderr + rotated JSON file)
//! - Best-effort metadata propagation (exiftool/xattr/timestamps)
//! - Verbatim retention copies into the destination tree
//! - ffprobe wrapper for codec and bit-depth probing
//! - Worker/encoder thread budgeting
//! - Dangerous-directory guard for delete loops

pub mod batch;
pub mod copier;
pub mod ffprobe;
pub mod logging;
pub mod metadata;
pub mod progress;
pub mod report;
pub mod safety;
pub mod threading;

pub use batch::{collect_files, has_extension, BatchResult};
pub use copier::{mirror_path, mirror_path_with_extension, retain_original, RetainStatus};
pub use ffprobe::{detect_bit_depth, is_ffprobe_available, probe_video, ProbeError, VideoProbe};
pub use logging::{init_logging, LogConfig};
pub use progress::{format_bytes, format_duration, BatchProgress};
pub use report::{print_simple_summary, print_summary_report};
pub use safety::check_dangerous_directory;
pub use threading::{plan_image_workers, ThreadPlan};
