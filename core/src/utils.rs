use std::collections::TryReserveError;
use std::fmt;
use num_enum::TryFromPrimitive;

use crate::compression::CompressionCodec;
use crate::constants::{MAX_AUTO_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_AUTO_BLOCK_SIZE};

/// CRC32 (IEEE) used for the optional per-block integrity check.
#[inline]
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Number of blocks needed to cover `len` bytes.
#[inline]
pub fn block_count(len: usize, block_size: usize) -> usize {
    if len == 0 {
        0
    } else {
        len.div_ceil(block_size)
    }
}

/// Round `size` down to a whole number of elements, never below one element.
#[inline]
pub fn align_to_typesize(size: usize, typesize: usize) -> usize {
    let aligned = size - size % typesize;
    aligned.max(typesize)
}

/// Zero-filled buffer of `len` bytes, or an error when the allocator cannot
/// back it. Sizes declared by a frame go through here so a corrupt header
/// fails instead of aborting the process.
pub fn try_zeroed(len: usize) -> Result<Vec<u8>, TryReserveError> {
    // Check the reservation first; `vec!` then takes the zeroed-allocation path.
    let mut reserved: Vec<u8> = Vec::new();
    reserved.try_reserve_exact(len)?;
    drop(reserved);
    Ok(vec![0u8; len])
}

/// Pick a block size when the caller asked for automatic sizing.
///
/// - Starts from a level-based base so fast levels keep blocks cache-resident.
/// - High-ratio codecs (zlib, zstd) get twice the room to find matches.
/// - Wider elements grow the block so each shuffle plane stays long enough.
/// - Never larger than the input itself, always a whole number of elements.
pub fn best_block_size(
    nbytes: usize,
    typesize: usize,
    level: u8,
    codec: CompressionCodec,
) -> usize {
    let mut size = match level {
        0 => MIN_AUTO_BLOCK_SIZE,
        1..=3 => 32 * 1024,
        4..=6 => 64 * 1024,
        7..=8 => 128 * 1024,
        _ => 256 * 1024,
    };

    if codec.is_high_ratio() {
        size *= 2;
    }
    if typesize > 1 {
        size *= typesize.next_power_of_two().min(16);
    }

    let size = size.clamp(MIN_AUTO_BLOCK_SIZE, MAX_AUTO_BLOCK_SIZE);
    let size = size.min(nbytes.max(1)).min(MAX_BLOCK_SIZE);
    align_to_typesize(size, typesize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_count_rounds_up() {
        assert_eq!(block_count(0, 10), 0);
        assert_eq!(block_count(10, 10), 1);
        assert_eq!(block_count(11, 10), 2);
    }

    #[test]
    fn zeroed_buffer_has_requested_len() {
        let buf = try_zeroed(4096).unwrap();
        assert_eq!(buf.len(), 4096);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn unbackable_buffer_is_an_error() {
        assert!(try_zeroed(usize::MAX).is_err());
        assert!(try_zeroed(isize::MAX as usize).is_err());
    }

    #[test]
    fn auto_block_never_exceeds_input() {
        let size = best_block_size(1000, 4, 9, CompressionCodec::Zstd);
        assert_eq!(size, 1000);
    }

    #[test]
    fn auto_block_is_element_aligned() {
        let size = best_block_size(10 * 1024 * 1024, 12, 5, CompressionCodec::Lz4);
        assert_eq!(size % 12, 0);
        assert!(size <= MAX_AUTO_BLOCK_SIZE);
    }

    #[test]
    fn high_ratio_codecs_get_bigger_blocks() {
        let n = 64 * 1024 * 1024;
        assert!(
            best_block_size(n, 1, 5, CompressionCodec::Zstd)
                > best_block_size(n, 1, 5, CompressionCodec::Lz4)
        );
    }
}
