//! compression/codecs/mod.rs
//! Block codec implementations. Each is stateless and deterministic, so the
//! same input always produces the same bytes on any worker.

pub mod lzd;
#[cfg(feature = "lz4")]
pub mod lz4;
#[cfg(feature = "snappy")]
pub mod snappy;
#[cfg(feature = "zlib")]
pub mod zlib;
#[cfg(feature = "zstd")]
pub mod zstd;

pub use lzd::DefaultCodec;
#[cfg(feature = "lz4")]
pub use self::lz4::Lz4Codec;
#[cfg(feature = "snappy")]
pub use snappy::SnappyCodec;
#[cfg(feature = "zlib")]
pub use zlib::ZlibCodec;
#[cfg(feature = "zstd")]
pub use self::zstd::ZstdCodec;
