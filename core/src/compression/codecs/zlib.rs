//! codecs/zlib.rs
//! zlib (deflate with zlib wrapper) via flate2. Every block is its own stream.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::compression::constants::zlib_level;
use crate::compression::types::{BlockCodec, CompressionCodec, CompressionError};

pub struct ZlibCodec;

impl BlockCodec for ZlibCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Zlib
    }

    fn compress_block(&self, input: &[u8], level: u8, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut enc = ZlibEncoder::new(Vec::with_capacity(input.len() / 2), Compression::new(zlib_level(level)));
        enc.write_all(input)
            .map_err(|e| CompressionError::failure(CompressionCodec::Zlib, e))?;
        let compressed = enc
            .finish()
            .map_err(|e| CompressionError::failure(CompressionCodec::Zlib, e))?;
        out.extend_from_slice(&compressed);
        Ok(())
    }

    fn decompress_block(&self, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
        let mut dec = ZlibDecoder::new(input);
        dec.read_exact(out)
            .map_err(|e| CompressionError::failure(CompressionCodec::Zlib, e))?;

        // The stream must end exactly at the expected length.
        let mut extra = [0u8; 1];
        match dec.read(&mut extra) {
            Ok(0) => Ok(()),
            Ok(_) => Err(CompressionError::SizeMismatch {
                codec: CompressionCodec::Zlib.name(),
                expected: out.len(),
                actual: out.len() + 1,
            }),
            Err(e) => Err(CompressionError::failure(CompressionCodec::Zlib, e)),
        }
    }
}
