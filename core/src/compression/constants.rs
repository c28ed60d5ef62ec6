//! compression/constants.rs
//! Stable codec ids for the descriptor table, plus level mapping.

/// Stable codec ids (u8) written into every block descriptor.
pub mod codec_ids {
    pub const STORED: u8  = 0x00;
    pub const DEFAULT: u8 = 0x01;
    pub const LZ4: u8     = 0x02;
    pub const SNAPPY: u8  = 0x03;
    pub const ZLIB: u8    = 0x04;
    pub const ZSTD: u8    = 0x05;
}

/// zlib accepts 1..=9 directly.
#[inline]
pub fn zlib_level(level: u8) -> u32 {
    level.clamp(1, 9) as u32
}

/// zstd levels grow faster than ours; 9 maps to the top of the non-ultra range.
#[inline]
pub fn zstd_level(level: u8) -> i32 {
    match level {
        0 => 1,
        9..=u8::MAX => 19,
        l => 2 * l as i32 - 1,
    }
}

/// Hash table width for the internal codec: wider tables find more matches.
#[inline]
pub fn default_codec_hash_log(level: u8) -> u32 {
    match level {
        0..=3 => 12,
        4..=6 => 13,
        _ => 14,
    }
}
