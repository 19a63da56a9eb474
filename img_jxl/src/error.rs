//! Error taxonomy for the conversion pipeline.
//!
//! The split matters for control flow: an [`ConvertError::EncodeFailure`]
//! can be answered by trying another route, a
//! [`ConvertError::DecodeFailure`] cannot, so it ends the file immediately.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source image could not be decoded at all; terminal for this file.
    #[error("decode failed: {0}")]
    DecodeFailure(String),

    /// The external encoder exited non-zero. Recoverable while other
    /// strategies remain, terminal once the fallback route fails too.
    #[error("encode failed: {0}")]
    EncodeFailure(String),

    /// A required external tool is not on PATH.
    #[error("required tool not found: {0}")]
    ToolNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
