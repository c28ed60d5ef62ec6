//! filters/mod.rs
//! Reversible byte-reordering transforms applied before compression.
//!
//! - `Shuffle` groups byte k of every element into plane k.
//! - `BitShuffle` does the same at bit granularity, 8 elements at a time.
//! - Planes are ordered by significance, so `ByteOrder` decides which byte
//!   of an element lands in plane 0.
//! - Inputs must be a whole number of elements; the block layer carries any
//!   trailing partial element separately.

pub mod bitshuffle;
pub mod shuffle;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use num_enum::TryFromPrimitive;
use thiserror::Error;
use tracing::debug;

use crate::cpu;

/// Filter identifiers (u8) written into every block descriptor.
pub mod filter_ids {
    pub const NONE: u8        = 0x00;
    pub const SHUFFLE: u8     = 0x01;
    pub const BITSHUFFLE: u8  = 0x02;
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum FilterKind {
    #[default]
    None       = filter_ids::NONE,
    Shuffle    = filter_ids::SHUFFLE,
    BitShuffle = filter_ids::BITSHUFFLE,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::None       => "noshuffle",
            FilterKind::Shuffle    => "shuffle",
            FilterKind::BitShuffle => "bitshuffle",
        }
    }

    pub fn verify(raw: u8) -> Result<FilterKind, FilterError> {
        FilterKind::try_from_primitive(raw).map_err(|_| FilterError::UnknownFilter { raw })
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noshuffle" | "none" => Ok(FilterKind::None),
            "shuffle" => Ok(FilterKind::Shuffle),
            "bitshuffle" => Ok(FilterKind::BitShuffle),
            _ => Err(FilterError::UnknownFilterName { name: s.to_string() }),
        }
    }
}

/// Byte order of the elements being filtered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    /// Byte position inside an element that holds significance `plane`
    /// (plane 0 = least significant).
    #[inline(always)]
    pub(crate) fn byte_index(self, plane: usize, typesize: usize) -> usize {
        match self {
            ByteOrder::Little => plane,
            ByteOrder::Big => typesize - 1 - plane,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::native()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid element size {element_size} for {len} bytes")]
    InvalidElementSize { element_size: usize, len: usize },

    #[error("unknown filter id: 0x{raw:02x}")]
    UnknownFilter { raw: u8 },

    #[error("unknown filter name: {name:?}")]
    UnknownFilterName { name: String },
}

/// Kernel family used by the shuffle routines.
///
/// Both families produce identical bytes; `Wide` walks the data in
/// fixed-width groups that vectorise well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Scalar,
    Wide,
}

static KERNEL: OnceLock<Kernel> = OnceLock::new();

/// Kernel picked for this process from the CPU capability set.
pub fn active_kernel() -> Kernel {
    *KERNEL.get_or_init(|| {
        let kernel = if cpu::features().has_vector_unit() {
            Kernel::Wide
        } else {
            Kernel::Scalar
        };
        debug!(?kernel, "filter kernel selected");
        kernel
    })
}

fn check_element_size(input: &[u8], element_size: usize) -> Result<(), FilterError> {
    if element_size == 0 || input.len() % element_size != 0 {
        return Err(FilterError::InvalidElementSize { element_size, len: input.len() });
    }
    Ok(())
}

/// Apply `kind` to little-endian elements of `element_size` bytes.
pub fn apply(kind: FilterKind, input: &[u8], element_size: usize) -> Result<Vec<u8>, FilterError> {
    apply_ordered(kind, input, element_size, ByteOrder::Little)
}

/// Undo `apply`.
pub fn invert(kind: FilterKind, input: &[u8], element_size: usize) -> Result<Vec<u8>, FilterError> {
    invert_ordered(kind, input, element_size, ByteOrder::Little)
}

pub fn apply_ordered(
    kind: FilterKind,
    input: &[u8],
    element_size: usize,
    order: ByteOrder,
) -> Result<Vec<u8>, FilterError> {
    apply_with(active_kernel(), kind, input, element_size, order)
}

pub fn invert_ordered(
    kind: FilterKind,
    input: &[u8],
    element_size: usize,
    order: ByteOrder,
) -> Result<Vec<u8>, FilterError> {
    invert_with(active_kernel(), kind, input, element_size, order)
}

/// Apply with an explicit kernel.
pub fn apply_with(
    kernel: Kernel,
    kind: FilterKind,
    input: &[u8],
    element_size: usize,
    order: ByteOrder,
) -> Result<Vec<u8>, FilterError> {
    check_element_size(input, element_size)?;
    let mut out = vec![0u8; input.len()];
    match (kind, kernel) {
        (FilterKind::None, _) => out.copy_from_slice(input),
        (FilterKind::Shuffle, Kernel::Scalar) => shuffle::shuffle_scalar(input, &mut out, element_size, order),
        (FilterKind::Shuffle, Kernel::Wide) => shuffle::shuffle_wide(input, &mut out, element_size, order),
        (FilterKind::BitShuffle, Kernel::Scalar) => bitshuffle::bitshuffle_scalar(input, &mut out, element_size, order),
        (FilterKind::BitShuffle, Kernel::Wide) => bitshuffle::bitshuffle_wide(input, &mut out, element_size, order),
    }
    Ok(out)
}

/// Invert with an explicit kernel.
pub fn invert_with(
    kernel: Kernel,
    kind: FilterKind,
    input: &[u8],
    element_size: usize,
    order: ByteOrder,
) -> Result<Vec<u8>, FilterError> {
    check_element_size(input, element_size)?;
    let mut out = vec![0u8; input.len()];
    match (kind, kernel) {
        (FilterKind::None, _) => out.copy_from_slice(input),
        (FilterKind::Shuffle, Kernel::Scalar) => shuffle::unshuffle_scalar(input, &mut out, element_size, order),
        (FilterKind::Shuffle, Kernel::Wide) => shuffle::unshuffle_wide(input, &mut out, element_size, order),
        (FilterKind::BitShuffle, Kernel::Scalar) => bitshuffle::bitunshuffle_scalar(input, &mut out, element_size, order),
        (FilterKind::BitShuffle, Kernel::Wide) => bitshuffle::bitunshuffle_wide(input, &mut out, element_size, order),
    }
    Ok(out)
}
