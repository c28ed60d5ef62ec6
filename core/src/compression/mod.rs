//! compression/mod.rs
//! Codec registry: maps codec ids to stateless block codecs.
//!
//! - Per-block compression is deterministic, which keeps parallel and
//!   sequential frames byte-identical.
//! - Which codecs exist is a build-time decision (cargo features); asking for
//!   a missing one is an error, never a panic.
//! - Blocks that do not shrink are reported as `StoredRaw`.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
