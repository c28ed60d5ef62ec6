//! Binary frame container.
//!
//! ```text
//! [ header (24) ][ descriptor × block_count ][ payload section ]
//! ```
//!
//! Responsibilities:
//! - Define the header, descriptors and owned/borrowed frame types
//! - Encode frames into the canonical layout
//! - Decode frames with strict validation, descriptor table first
//!
//! Non-responsibilities:
//! - Compression and filtering
//! - Parallelism

pub mod decode;
pub mod encode;
pub mod types;
mod validate;

pub use decode::{deserialize, deserialize_bytes, frame_info, parse_header};
pub use encode::{encode_header, serialize};
pub use types::{BlockDescriptor, Frame, FrameError, FrameFlags, FrameHeader, FrameInfo, FrameView, HeaderFault};
