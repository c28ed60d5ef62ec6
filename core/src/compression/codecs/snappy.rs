//! codecs/snappy.rs
//! Snappy raw (unframed) format via snap.

use crate::compression::types::{BlockCodec, CompressionCodec, CompressionError};

pub struct SnappyCodec;

impl BlockCodec for SnappyCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Snappy
    }

    fn compress_block(&self, input: &[u8], _level: u8, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = snap::raw::Encoder::new()
            .compress_vec(input)
            .map_err(|e| CompressionError::failure(CompressionCodec::Snappy, e))?;
        out.extend_from_slice(&compressed);
        Ok(())
    }

    fn decompress_block(&self, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
        // The raw format starts with its own varint length; check it before decoding.
        let declared = snap::raw::decompress_len(input)
            .map_err(|e| CompressionError::failure(CompressionCodec::Snappy, e))?;
        if declared != out.len() {
            return Err(CompressionError::SizeMismatch {
                codec: CompressionCodec::Snappy.name(),
                expected: out.len(),
                actual: declared,
            });
        }
        snap::raw::Decoder::new()
            .decompress(input, out)
            .map_err(|e| CompressionError::failure(CompressionCodec::Snappy, e))?;
        Ok(())
    }
}
