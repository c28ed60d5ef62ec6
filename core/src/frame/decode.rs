use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use tracing::debug;

use crate::compression::CompressionCodec;
use crate::constants::{FRAME_MAGIC, FRAME_VERSION};
use crate::filters::FilterKind;
use crate::frame::types::{
    BlockDescriptor, Frame, FrameError, FrameFlags, FrameHeader, FrameInfo, FrameView, HeaderFault,
};
use crate::frame::validate::{validate_descriptors, validate_header};
use crate::utils::compute_checksum;

/// Parse and validate the fixed header at the start of `wire`.
pub fn parse_header(wire: &[u8]) -> Result<FrameHeader, FrameError> {
    if wire.len() < FrameHeader::LEN {
        return Err(FrameError::TruncatedInput { need: FrameHeader::LEN, have: wire.len() });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&wire[0..4]);
    if magic != FRAME_MAGIC {
        return Err(HeaderFault::BadMagic(magic).into());
    }
    if wire[4] != FRAME_VERSION {
        return Err(HeaderFault::UnsupportedVersion(wire[4]).into());
    }
    let flags = FrameFlags::from_bits(wire[5])
        .ok_or(HeaderFault::UnknownFlags(wire[5] & !FrameFlags::all().bits()))?;
    if wire[7] != 0 {
        return Err(HeaderFault::Reserved(wire[7]).into());
    }

    let header = FrameHeader {
        flags,
        typesize: wire[6],
        uncompressed_size: LittleEndian::read_u64(&wire[8..16]),
        block_size: LittleEndian::read_u32(&wire[16..20]),
        block_count: LittleEndian::read_u32(&wire[20..24]),
    };
    validate_header(&header)?;
    Ok(header)
}

/// Decode the descriptor table following the header. Offsets are assigned
/// from the running sum of compressed lengths.
fn parse_descriptors(header: &FrameHeader, table: &[u8]) -> Result<Vec<BlockDescriptor>, FrameError> {
    let stride = header.descriptor_len();
    let mut offset = 0u64;
    let mut out = Vec::with_capacity(header.block_count as usize);

    for (index, raw) in table.chunks_exact(stride).enumerate() {
        let codec = CompressionCodec::try_from(raw[0])
            .map_err(|_| FrameError::UnsupportedCodec { index, codec_id: raw[0] })?;
        let filter = FilterKind::try_from(raw[1])
            .map_err(|_| FrameError::InvalidDescriptor { index, reason: "unknown filter id" })?;
        let compressed_len = LittleEndian::read_u32(&raw[2..6]);
        let uncompressed_len = LittleEndian::read_u32(&raw[6..10]);
        let checksum = header.has_checksum().then(|| LittleEndian::read_u32(&raw[10..14]));

        out.push(BlockDescriptor { codec, filter, compressed_len, uncompressed_len, checksum, offset });
        offset += compressed_len as u64;
    }
    Ok(out)
}

/// Header plus descriptor table; returns the table end offset.
fn parse_table(wire: &[u8]) -> Result<(FrameHeader, Vec<BlockDescriptor>, usize, usize), FrameError> {
    let header = parse_header(wire)?;

    let table_end = FrameHeader::LEN + header.descriptor_table_len();
    if wire.len() < table_end {
        return Err(FrameError::TruncatedInput { need: table_end, have: wire.len() });
    }
    let descriptors = parse_descriptors(&header, &wire[FrameHeader::LEN..table_end])?;
    let payload_len = validate_descriptors(&header, &descriptors)?;
    Ok((header, descriptors, table_end, payload_len))
}

impl<'a> FrameView<'a> {
    /// Parse a frame that spans all of `wire`.
    pub fn parse(wire: &'a [u8]) -> Result<Self, FrameError> {
        let (view, used) = Self::parse_prefix(wire)?;
        if used != wire.len() {
            return Err(FrameError::LengthMismatch { expected: used, actual: wire.len() });
        }
        Ok(view)
    }

    /// Parse a frame at the start of `wire`, allowing trailing bytes.
    /// Returns the view and the number of bytes it spans.
    ///
    /// The header and full descriptor table are validated, the payload
    /// section bounds-checked, and checksums verified, before returning.
    pub fn parse_prefix(wire: &'a [u8]) -> Result<(Self, usize), FrameError> {
        let result = parse_prefix_inner(wire);
        if let Err(e) = &result {
            debug!(error = %e, len = wire.len(), "frame rejected");
        }
        result
    }

    /// Recompute and compare every block checksum. No-op without CHECKSUM.
    pub fn verify_checksums(&self) -> Result<(), FrameError> {
        for (block, d) in self.descriptors.iter().enumerate() {
            let Some(expected) = d.checksum else { continue };
            let actual = compute_checksum(&self.payload[d.payload_range()]);
            if actual != expected {
                return Err(FrameError::ChecksumMismatch { block, expected, actual });
            }
        }
        Ok(())
    }
}

fn parse_prefix_inner(wire: &[u8]) -> Result<(FrameView<'_>, usize), FrameError> {
    let (header, descriptors, table_end, payload_len) = parse_table(wire)?;

    let end = table_end + payload_len;
    if wire.len() < end {
        return Err(FrameError::TruncatedInput { need: end, have: wire.len() });
    }

    let view = FrameView { header, descriptors, payload: &wire[table_end..end] };
    view.verify_checksums()?;
    Ok((view, end))
}

/// Parse into an owned frame, copying the payload section.
pub fn deserialize(wire: &[u8]) -> Result<Frame, FrameError> {
    Ok(FrameView::parse(wire)?.to_frame())
}

/// Parse into an owned frame that shares `wire`'s allocation.
pub fn deserialize_bytes(wire: Bytes) -> Result<Frame, FrameError> {
    let (header, descriptors, payload_start, payload_len) = {
        let view = FrameView::parse(&wire)?;
        let start = wire.len() - view.payload.len();
        (view.header, view.descriptors, start, view.payload.len())
    };
    let payload = wire.slice(payload_start..payload_start + payload_len);
    Ok(Frame { header, descriptors, payload })
}

/// Header-level metadata; payload bytes are never read.
pub fn frame_info(wire: &[u8]) -> Result<FrameInfo, FrameError> {
    let (header, descriptors, table_end, payload_len) = parse_table(wire)?;
    Ok(FrameInfo {
        uncompressed_size: header.uncompressed_size,
        frame_len: table_end + payload_len,
        typesize: header.typesize as usize,
        block_size: header.block_size as usize,
        block_count: header.block_count as usize,
        filter: header.filter()?,
        byte_order: header.byte_order(),
        checksum: header.has_checksum(),
        stored_blocks: descriptors.iter().filter(|d| d.is_stored()).count(),
    })
}
