//! blocz-core
//!
//! Pluggable, multi-threaded block compression.
//! Buffers are split into blocks, each block is filtered (shuffle or
//! bitshuffle) and compressed independently, and the results are packed into
//! a self-describing frame.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod cpu;
pub mod config;

// Layers, leaves first
pub mod compression;
pub mod filters;
pub mod frame;
pub mod dispatch;
pub mod block;
pub mod telemetry;
pub mod io;

use crate::compression::registry;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Names of the codecs compiled into this build.
pub fn list_codecs() -> Vec<&'static str> {
    registry::enabled_codecs().into_iter().map(|c| c.name()).collect()
}

// -----------------------------------------------------------------------------
// Prelude
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::block::{
        compress, compress_with_telemetry, decompress, decompress_block, decompress_bytes,
        decompress_with_telemetry, get_items,
    };
    pub use crate::compression::CompressionCodec;
    pub use crate::config::{BlockSize, CompressionContext, CompressionContextBuilder};
    pub use crate::filters::{ByteOrder, FilterKind};
    pub use crate::frame::{frame_info, Frame, FrameInfo, FrameView};
    pub use crate::io::{compress_stream, decompress_stream, read_frame, write_frame};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{BloczError, Result};
}
