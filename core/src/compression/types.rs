//! compression/types.rs
//! Codec identifiers, the block codec trait, and registry errors.
use std::fmt;
use std::str::FromStr;

use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::compression::constants::codec_ids;
use crate::utils::enum_name_or_hex;

/// Wire-level codec identifier.
///
/// `Stored` marks a raw-stored block and is never user-selectable.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CompressionCodec {
    Stored  = codec_ids::STORED,
    Default = codec_ids::DEFAULT,
    Lz4     = codec_ids::LZ4,
    Snappy  = codec_ids::SNAPPY,
    Zlib    = codec_ids::ZLIB,
    Zstd    = codec_ids::ZSTD,
}

impl CompressionCodec {
    /// Every codec a caller may select, in id order.
    pub const SELECTABLE: [CompressionCodec; 5] = [
        CompressionCodec::Default,
        CompressionCodec::Lz4,
        CompressionCodec::Snappy,
        CompressionCodec::Zlib,
        CompressionCodec::Zstd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::Stored  => "stored",
            CompressionCodec::Default => "default",
            CompressionCodec::Lz4     => "lz4",
            CompressionCodec::Snappy  => "snappy",
            CompressionCodec::Zlib    => "zlib",
            CompressionCodec::Zstd    => "zstd",
        }
    }

    pub fn is_selectable(self) -> bool {
        self != CompressionCodec::Stored
    }

    /// High compression-ratio codecs get larger automatic blocks.
    pub fn is_high_ratio(self) -> bool {
        matches!(self, CompressionCodec::Zlib | CompressionCodec::Zstd)
    }

    pub fn verify(raw: u8) -> Result<CompressionCodec, CompressionError> {
        CompressionCodec::try_from_primitive(raw)
            .map_err(|_| CompressionError::UnknownCodec { raw })
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionCodec {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CompressionCodec::SELECTABLE
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or(CompressionError::UnknownCodecName { name: s.to_string() })
    }
}

/// Result of running one block through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecOutcome {
    /// Encoded bytes, strictly shorter than the input.
    Compressed(Vec<u8>),
    /// Compression would not shrink the block; caller copies it verbatim.
    StoredRaw,
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("unsupported compression codec: {}", codec_label(.codec_id))]
    UnsupportedCodec { codec_id: u8 },

    #[error("unknown codec id: 0x{raw:02x}")]
    UnknownCodec { raw: u8 },

    #[error("unknown codec name: {name:?}")]
    UnknownCodecName { name: String },

    #[error("codec {codec} failed: {msg}")]
    CodecFailure { codec: &'static str, msg: String },

    #[error("codec {codec} produced {actual} bytes, expected {expected}")]
    SizeMismatch { codec: &'static str, expected: usize, actual: usize },

    #[error("block too large: {have} > {max}")]
    BlockTooLarge { have: usize, max: usize },
}

fn codec_label(raw: &u8) -> String {
    enum_name_or_hex::<CompressionCodec>(*raw)
}

impl CompressionError {
    pub(crate) fn failure(codec: CompressionCodec, msg: impl fmt::Display) -> Self {
        CompressionError::CodecFailure { codec: codec.name(), msg: msg.to_string() }
    }
}

/// A stateless block codec.
///
/// Implementations hold no per-call state so one instance serves every worker.
pub trait BlockCodec: Send + Sync {
    fn codec(&self) -> CompressionCodec;

    /// Encode `input` into `out` (appending). `level` is already in 1..=9.
    fn compress_block(&self, input: &[u8], level: u8, out: &mut Vec<u8>) -> Result<(), CompressionError>;

    /// Decode `input` into exactly `out.len()` bytes.
    fn decompress_block(&self, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError>;
}
