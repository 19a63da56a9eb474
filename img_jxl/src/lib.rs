//! Recursive image to JPEG XL conversion with a size-guarded quality search.
//!
//! The pipeline mirrors a source tree into a destination tree: convertible
//! images become `.jxl` (only when that actually saves bytes, unless forced),
//! recognized but unconvertible formats are copied verbatim, and failures
//! retain the original so the destination tree is always complete.

pub mod config;
pub mod conflict;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod strategy;

pub use config::{classify, normalize_copy_extensions, Config, FileClass, ImageKind, QualityFloor};
pub use conflict::{ConflictPolicy, Prompter, TerminalPrompter};
pub use encoder::{Cjxl, EncodeParams, EncoderInput, JxlEncoder};
pub use error::{ConvertError, Result};
pub use pipeline::{convert_file, ConversionRequest, FileOutcome};
