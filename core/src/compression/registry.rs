//! compression/registry.rs
//! Codec lookup, capability set, and the raw-store policy.
use tracing::trace;

use crate::compression::codecs::DefaultCodec;
#[cfg(feature = "lz4")]
use crate::compression::codecs::Lz4Codec;
#[cfg(feature = "snappy")]
use crate::compression::codecs::SnappyCodec;
#[cfg(feature = "zlib")]
use crate::compression::codecs::ZlibCodec;
#[cfg(feature = "zstd")]
use crate::compression::codecs::ZstdCodec;
use crate::compression::types::{BlockCodec, CodecOutcome, CompressionCodec, CompressionError};
use crate::constants::{MAX_BLOCK_SIZE, MAX_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecInfo {
    pub codec: CompressionCodec,
    pub name: &'static str,
    /// Whether `level` changes the output at all.
    pub honours_level: bool,
    pub enabled: bool,
}

pub fn resolve(codec: CompressionCodec) -> CodecInfo {
    let honours_level = matches!(
        codec,
        CompressionCodec::Default | CompressionCodec::Zlib | CompressionCodec::Zstd
    );
    CodecInfo {
        codec,
        name: codec.name(),
        honours_level,
        enabled: is_enabled(codec),
    }
}

/// Whether this build carries an implementation for `codec`.
pub fn is_enabled(codec: CompressionCodec) -> bool {
    match codec {
        CompressionCodec::Stored | CompressionCodec::Default => true,
        CompressionCodec::Lz4 => cfg!(feature = "lz4"),
        CompressionCodec::Snappy => cfg!(feature = "snappy"),
        CompressionCodec::Zlib => cfg!(feature = "zlib"),
        CompressionCodec::Zstd => cfg!(feature = "zstd"),
    }
}

/// Selectable codecs compiled into this build.
pub fn enabled_codecs() -> Vec<CompressionCodec> {
    CompressionCodec::SELECTABLE
        .into_iter()
        .filter(|c| is_enabled(*c))
        .collect()
}

/// Look up the implementation for `codec`.
///
/// `Stored` has no codec: stored blocks are copied, not decoded.
pub fn codec_for(codec: CompressionCodec) -> Result<&'static dyn BlockCodec, CompressionError> {
    let unsupported = CompressionError::UnsupportedCodec { codec_id: codec as u8 };
    match codec {
        CompressionCodec::Default => Ok(&DefaultCodec),
        #[cfg(feature = "lz4")]
        CompressionCodec::Lz4 => Ok(&Lz4Codec),
        #[cfg(feature = "snappy")]
        CompressionCodec::Snappy => Ok(&SnappyCodec),
        #[cfg(feature = "zlib")]
        CompressionCodec::Zlib => Ok(&ZlibCodec),
        #[cfg(feature = "zstd")]
        CompressionCodec::Zstd => Ok(&ZstdCodec),
        #[allow(unreachable_patterns)]
        _ => Err(unsupported),
    }
}

/// Compress one block, applying the raw-store policy.
///
/// Returns `StoredRaw` for level 0, empty input, or when the encoded form is
/// not strictly smaller than `input`.
pub fn compress(codec: CompressionCodec, input: &[u8], level: u8) -> Result<CodecOutcome, CompressionError> {
    if input.len() > MAX_BLOCK_SIZE {
        return Err(CompressionError::BlockTooLarge { have: input.len(), max: MAX_BLOCK_SIZE });
    }
    let imp = codec_for(codec)?;
    if level == 0 || input.is_empty() {
        return Ok(CodecOutcome::StoredRaw);
    }

    let mut out = Vec::with_capacity(input.len());
    imp.compress_block(input, level.min(MAX_LEVEL), &mut out)?;

    if out.len() >= input.len() {
        trace!(codec = %codec, len = input.len(), encoded = out.len(), "block does not shrink, storing raw");
        return Ok(CodecOutcome::StoredRaw);
    }
    Ok(CodecOutcome::Compressed(out))
}

/// Decompress one block into a fresh buffer of `expected_len` bytes.
pub fn decompress(codec: CompressionCodec, input: &[u8], expected_len: usize) -> Result<Vec<u8>, CompressionError> {
    let mut out = vec![0u8; expected_len];
    decompress_into(codec, input, &mut out)?;
    Ok(out)
}

/// Decompress one block into `out`, which must be exactly the block's
/// uncompressed length.
pub fn decompress_into(codec: CompressionCodec, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
    if codec == CompressionCodec::Stored {
        if input.len() != out.len() {
            return Err(CompressionError::SizeMismatch {
                codec: codec.name(),
                expected: out.len(),
                actual: input.len(),
            });
        }
        out.copy_from_slice(input);
        return Ok(());
    }
    codec_for(codec)?.decompress_block(input, out)
}
