//! constants.rs
//! Wire constants, size bounds, and defaults shared across layers.

/// Frame magic: "BLZF" = blocz frame.
pub const FRAME_MAGIC: [u8; 4] = *b"BLZF";
/// Current frame format version.
pub const FRAME_VERSION: u8 = 1;

/// Smallest block the automatic sizing will choose.
pub const MIN_AUTO_BLOCK_SIZE: usize = 16 * 1024;
/// Largest block the automatic sizing will choose (2 MiB).
pub const MAX_AUTO_BLOCK_SIZE: usize = 2 * 1024 * 1024;
/// Max block size sanity bound (32 MiB).
pub const MAX_BLOCK_SIZE: usize = 32 * 1024 * 1024;

/// Largest element width the header can carry.
pub const MAX_TYPESIZE: usize = u8::MAX as usize;

/// Compression levels run 0 (store) ..= 9 (best).
pub const MAX_LEVEL: u8 = 9;
pub const DEFAULT_LEVEL: u8 = 5;

/// Default chunk length used by the streaming helpers (4 MiB per frame).
pub const DEFAULT_STREAM_CHUNK: usize = 4 * 1024 * 1024;

/// Environment overrides consulted by `CompressionContext::with_env_overrides`.
pub mod env {
    pub const CLEVEL: &str = "BLOCZ_CLEVEL";
    pub const COMPRESSOR: &str = "BLOCZ_COMPRESSOR";
    pub const SHUFFLE: &str = "BLOCZ_SHUFFLE";
    pub const TYPESIZE: &str = "BLOCZ_TYPESIZE";
    pub const BLOCKSIZE: &str = "BLOCZ_BLOCKSIZE";
    pub const NTHREADS: &str = "BLOCZ_NTHREADS";
    pub const CHECKSUM: &str = "BLOCZ_CHECKSUM";
    pub const DISABLE_SIMD: &str = "BLOCZ_DISABLE_SIMD";
}
