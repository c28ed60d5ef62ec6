//! types.rs
//! Crate-level error aggregating every layer.
//!
//! - `From<T>` impls let `?` cross layer boundaries.
//! - Variants follow the taxonomy callers act on: bad configuration, corrupt
//!   input, codec failure, filter misuse, I/O, pipeline bookkeeping.

use std::io;

use thiserror::Error;

use crate::compression::CompressionError;
use crate::config::ConfigError;
use crate::dispatch::DispatchError;
use crate::filters::FilterError;
use crate::frame::FrameError;

#[derive(Debug, Error)]
pub enum BloczError {
    /// Rejected before any work started.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Frame header, descriptor table, or payload section failed validation.
    #[error("corrupt frame: {0}")]
    CorruptFrame(#[from] FrameError),

    /// The underlying codec rejected a block, or the codec is unavailable.
    #[error("codec error: {0}")]
    Codec(#[from] CompressionError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] DispatchError),

    /// The decoded size a frame declares cannot be allocated.
    #[error("cannot allocate {bytes} bytes for decoded output")]
    OutputTooLarge { bytes: u64 },

    /// A partial read asked for data past the end of the frame.
    #[error("range {start}..{end} out of bounds (len {len})")]
    OutOfRange { start: usize, end: usize, len: usize },
}

impl BloczError {
    /// True when the error came from malformed or foreign input rather than
    /// from this process' configuration.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(self, BloczError::CorruptFrame(_))
            || matches!(self, BloczError::Codec(CompressionError::CodecFailure { .. }))
            || matches!(self, BloczError::Codec(CompressionError::SizeMismatch { .. }))
    }
}

pub type Result<T> = std::result::Result<T, BloczError>;
