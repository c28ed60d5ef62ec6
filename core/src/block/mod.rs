//! Chunked block compressor: buffer <-> frame.

pub mod compressor;
pub(crate) mod worker;

pub use compressor::{
    compress, compress_with_telemetry, decompress, decompress_block, decompress_bytes,
    decompress_bytes_with_telemetry, decompress_with_telemetry, get_items,
};
