use bitflags::bitflags;
use bytes::Bytes;
use thiserror::Error;

use crate::compression::CompressionCodec;
use crate::filters::{ByteOrder, FilterKind};

bitflags! {
    /// Header flag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u8 {
        const SHUFFLE    = 0x01;
        const BITSHUFFLE = 0x02;
        const CHECKSUM   = 0x04;
        const BIG_ENDIAN = 0x08;
    }
}

impl FrameFlags {
    pub fn from_filter(kind: FilterKind) -> Self {
        match kind {
            FilterKind::None => FrameFlags::empty(),
            FilterKind::Shuffle => FrameFlags::SHUFFLE,
            FilterKind::BitShuffle => FrameFlags::BITSHUFFLE,
        }
    }

    pub fn from_byte_order(order: ByteOrder) -> Self {
        match order {
            ByteOrder::Little => FrameFlags::empty(),
            ByteOrder::Big => FrameFlags::BIG_ENDIAN,
        }
    }

    pub fn filter(self) -> Result<FilterKind, HeaderFault> {
        match (self.contains(FrameFlags::SHUFFLE), self.contains(FrameFlags::BITSHUFFLE)) {
            (false, false) => Ok(FilterKind::None),
            (true, false) => Ok(FilterKind::Shuffle),
            (false, true) => Ok(FilterKind::BitShuffle),
            (true, true) => Err(HeaderFault::ConflictingFilters),
        }
    }

    pub fn byte_order(self) -> ByteOrder {
        if self.contains(FrameFlags::BIG_ENDIAN) {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// Fixed-size frame header. All integers are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: FrameFlags,
    pub typesize: u8,
    pub uncompressed_size: u64,
    pub block_size: u32,
    pub block_count: u32,
}

impl FrameHeader {
    pub const LEN: usize = 4 // magic
        + 1                  // version
        + 1                  // flags
        + 1                  // typesize
        + 1                  // reserved
        + 8                  // uncompressed_size
        + 4                  // block_size
        + 4;                 // block_count

    #[inline]
    pub fn has_checksum(&self) -> bool {
        self.flags.contains(FrameFlags::CHECKSUM)
    }

    /// Bytes per descriptor for this frame.
    #[inline]
    pub fn descriptor_len(&self) -> usize {
        if self.has_checksum() {
            BlockDescriptor::LEN + BlockDescriptor::CHECKSUM_LEN
        } else {
            BlockDescriptor::LEN
        }
    }

    #[inline]
    pub fn descriptor_table_len(&self) -> usize {
        self.block_count as usize * self.descriptor_len()
    }

    pub fn filter(&self) -> Result<FilterKind, HeaderFault> {
        self.flags.filter()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.flags.byte_order()
    }

    /// Block count implied by the declared sizes.
    pub fn expected_block_count(&self) -> u64 {
        if self.uncompressed_size == 0 || self.block_size == 0 {
            0
        } else {
            self.uncompressed_size.div_ceil(self.block_size as u64)
        }
    }

    /// Uncompressed length of block `index`; only the last block may be short.
    pub fn block_len(&self, index: usize) -> usize {
        let start = index as u64 * self.block_size as u64;
        let end = (start + self.block_size as u64).min(self.uncompressed_size);
        end.saturating_sub(start) as usize
    }

    /// Byte offset of block `index` within the uncompressed buffer.
    pub fn block_start(&self, index: usize) -> usize {
        index * self.block_size as usize
    }
}

/// Per-block metadata.
///
/// `offset` locates the payload inside the payload section. It is implied on
/// the wire (prefix sum of compressed lengths) and not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub codec: CompressionCodec,
    pub filter: FilterKind,
    pub compressed_len: u32,
    pub uncompressed_len: u32,
    pub checksum: Option<u32>,
    pub offset: u64,
}

impl BlockDescriptor {
    pub const LEN: usize = 1 // codec
        + 1                  // filter
        + 4                  // compressed_len
        + 4;                 // uncompressed_len
    pub const CHECKSUM_LEN: usize = 4;

    #[inline]
    pub fn is_stored(&self) -> bool {
        self.codec == CompressionCodec::Stored
    }

    #[inline]
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.compressed_len as usize
    }
}

/// What exactly is wrong with a header.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderFault {
    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown flag bits 0x{0:02x}")]
    UnknownFlags(u8),

    #[error("shuffle and bitshuffle both set")]
    ConflictingFilters,

    #[error("typesize is zero")]
    ZeroTypesize,

    #[error("reserved byte is 0x{0:02x}, expected 0")]
    Reserved(u8),

    #[error("block size is zero")]
    ZeroBlockSize,

    #[error("block size {block_size} exceeds maximum {max}")]
    BlockTooLarge { block_size: u32, max: usize },

    #[error("block count {declared} does not match {expected} implied by the sizes")]
    BlockCount { declared: u32, expected: u64 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("corrupt header: {0}")]
    CorruptHeader(#[from] HeaderFault),

    #[error("truncated input: need {need} bytes, have {have}")]
    TruncatedInput { need: usize, have: usize },

    #[error("block {index}: unsupported codec id 0x{codec_id:02x}")]
    UnsupportedCodec { index: usize, codec_id: u8 },

    #[error("block {index}: invalid descriptor ({reason})")]
    InvalidDescriptor { index: usize, reason: &'static str },

    #[error("block {block}: checksum mismatch (expected {expected:08x}, got {actual:08x})")]
    ChecksumMismatch { block: usize, expected: u32, actual: u32 },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Header-level metadata, read without decoding any payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub uncompressed_size: u64,
    /// Full encoded length: header, descriptor table and payload section.
    pub frame_len: usize,
    pub typesize: usize,
    pub block_size: usize,
    pub block_count: usize,
    pub filter: FilterKind,
    pub byte_order: ByteOrder,
    pub checksum: bool,
    /// Blocks that were stored raw.
    pub stored_blocks: usize,
}

impl FrameInfo {
    pub fn ratio(&self) -> f64 {
        if self.frame_len == 0 {
            return 0.0;
        }
        self.uncompressed_size as f64 / self.frame_len as f64
    }
}

/// Owned, immutable frame.
///
/// The payload section is a single `Bytes` buffer; block payloads are
/// addressed through descriptor offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub(crate) header: FrameHeader,
    pub(crate) descriptors: Vec<BlockDescriptor>,
    pub(crate) payload: Bytes,
}

impl Frame {
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn descriptors(&self) -> &[BlockDescriptor] {
        &self.descriptors
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn block_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.header.uncompressed_size
    }

    /// Stored payload of block `index`.
    pub fn block_payload(&self, index: usize) -> Option<Bytes> {
        let desc = self.descriptors.get(index)?;
        Some(self.payload.slice(desc.payload_range()))
    }

    /// Length of the serialized frame.
    pub fn encoded_len(&self) -> usize {
        FrameHeader::LEN + self.header.descriptor_table_len() + self.payload.len()
    }

    /// Borrowed view over this frame.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            header: self.header,
            descriptors: self.descriptors.clone(),
            payload: &self.payload,
        }
    }

    /// Split into header, descriptors and one payload per block.
    pub fn into_parts(self) -> (FrameHeader, Vec<BlockDescriptor>, Vec<Bytes>) {
        let payloads = self
            .descriptors
            .iter()
            .map(|d| self.payload.slice(d.payload_range()))
            .collect();
        (self.header, self.descriptors, payloads)
    }
}

/// Zero-copy view over a parsed frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub header: FrameHeader,
    pub descriptors: Vec<BlockDescriptor>,
    pub payload: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn block_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Stored payload of block `index`.
    pub fn block(&self, index: usize) -> Option<&'a [u8]> {
        let desc = self.descriptors.get(index)?;
        self.payload.get(desc.payload_range())
    }

    /// Copy into an owned frame.
    pub fn to_frame(&self) -> Frame {
        Frame {
            header: self.header,
            descriptors: self.descriptors.clone(),
            payload: Bytes::copy_from_slice(self.payload),
        }
    }
}
