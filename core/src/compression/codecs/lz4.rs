//! codecs/lz4.rs
//! LZ4 block format via lz4_flex.
//!
//! Block mode carries no size prefix: the descriptor already records the
//! uncompressed length, so the decoder writes straight into its slot.

use crate::compression::types::{BlockCodec, CompressionCodec, CompressionError};

pub struct Lz4Codec;

impl BlockCodec for Lz4Codec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Lz4
    }

    fn compress_block(&self, input: &[u8], _level: u8, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // lz4_flex has no acceleration or HC levels in block mode.
        out.extend_from_slice(&lz4_flex::block::compress(input));
        Ok(())
    }

    fn decompress_block(&self, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
        let written = lz4_flex::block::decompress_into(input, out)
            .map_err(|e| CompressionError::failure(CompressionCodec::Lz4, e))?;
        if written != out.len() {
            return Err(CompressionError::SizeMismatch {
                codec: CompressionCodec::Lz4.name(),
                expected: out.len(),
                actual: written,
            });
        }
        Ok(())
    }
}
