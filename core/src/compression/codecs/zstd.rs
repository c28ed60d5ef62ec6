//! codecs/zstd.rs
//! Zstandard single-shot block API. Each block is a standalone zstd frame.

use crate::compression::constants::zstd_level;
use crate::compression::types::{BlockCodec, CompressionCodec, CompressionError};

pub struct ZstdCodec;

impl BlockCodec for ZstdCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Zstd
    }

    fn compress_block(&self, input: &[u8], level: u8, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = zstd::bulk::compress(input, zstd_level(level))
            .map_err(|e| CompressionError::failure(CompressionCodec::Zstd, e))?;
        out.extend_from_slice(&compressed);
        Ok(())
    }

    fn decompress_block(&self, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
        let written = zstd::bulk::decompress_to_buffer(input, out)
            .map_err(|e| CompressionError::failure(CompressionCodec::Zstd, e))?;
        if written != out.len() {
            return Err(CompressionError::SizeMismatch {
                codec: CompressionCodec::Zstd.name(),
                expected: out.len(),
                actual: written,
            });
        }
        Ok(())
    }
}
