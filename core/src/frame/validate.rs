//! Structural checks shared by the encoder and the decoder.

use crate::frame::types::{BlockDescriptor, FrameError, FrameFlags, FrameHeader, HeaderFault};
use crate::constants::MAX_BLOCK_SIZE;
use crate::filters::FilterKind;

pub(crate) fn validate_header(header: &FrameHeader) -> Result<(), FrameError> {
    let unknown = header.flags.bits() & !FrameFlags::all().bits();
    if unknown != 0 {
        return Err(HeaderFault::UnknownFlags(unknown).into());
    }
    header.filter()?;
    if header.typesize == 0 {
        return Err(HeaderFault::ZeroTypesize.into());
    }
    if header.block_size == 0 {
        return Err(HeaderFault::ZeroBlockSize.into());
    }
    if header.block_size as usize > MAX_BLOCK_SIZE {
        return Err(HeaderFault::BlockTooLarge { block_size: header.block_size, max: MAX_BLOCK_SIZE }.into());
    }
    let expected = header.expected_block_count();
    if header.block_count as u64 != expected {
        return Err(HeaderFault::BlockCount { declared: header.block_count, expected }.into());
    }
    Ok(())
}

/// Check every descriptor against the header. Returns the payload section
/// length the descriptors describe.
pub(crate) fn validate_descriptors(
    header: &FrameHeader,
    descriptors: &[BlockDescriptor],
) -> Result<usize, FrameError> {
    if descriptors.len() != header.block_count as usize {
        return Err(FrameError::LengthMismatch {
            expected: header.block_count as usize,
            actual: descriptors.len(),
        });
    }

    let frame_filter = header.filter()?;
    let checksummed = header.has_checksum();
    let mut offset = 0u64;

    for (index, d) in descriptors.iter().enumerate() {
        let bad = |reason| FrameError::InvalidDescriptor { index, reason };

        if d.uncompressed_len as usize != header.block_len(index) {
            return Err(bad("uncompressed length does not match block position"));
        }
        if d.compressed_len > d.uncompressed_len {
            return Err(bad("compressed length exceeds uncompressed length"));
        }
        if d.is_stored() {
            if d.compressed_len != d.uncompressed_len {
                return Err(bad("stored block lengths differ"));
            }
            if d.filter != FilterKind::None {
                return Err(bad("stored block carries a filter"));
            }
        } else if d.compressed_len == 0 {
            return Err(bad("empty compressed payload"));
        }
        if d.filter != FilterKind::None && d.filter != frame_filter {
            return Err(bad("filter disagrees with header"));
        }
        if d.checksum.is_some() != checksummed {
            return Err(bad("checksum presence disagrees with header"));
        }
        if d.offset != offset {
            return Err(bad("payload offset is not contiguous"));
        }
        offset += d.compressed_len as u64;
    }

    Ok(offset as usize)
}
