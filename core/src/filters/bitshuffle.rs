//! filters/bitshuffle.rs
//! Bit-level shuffle.
//!
//! Layout for `n` elements of `typesize` bytes, `g = n / 8` full groups:
//!
//! ```text
//! row (p * 8 + b), p in 0..typesize, b in 0..8  -> g bytes
//!   bit r of byte k = bit b of the significance-p byte of element 8k + r
//! then the last n % 8 elements, copied verbatim
//! ```

use crate::filters::ByteOrder;

/// Transpose an 8x8 bit matrix held row-per-byte: bit (8r + c) moves to (8c + r).
#[inline(always)]
fn transpose8(mut x: u64) -> u64 {
    let mut t = (x ^ (x >> 7)) & 0x00AA_00AA_00AA_00AA;
    x ^= t ^ (t << 7);
    t = (x ^ (x >> 14)) & 0x0000_CCCC_0000_CCCC;
    x ^= t ^ (t << 14);
    t = (x ^ (x >> 28)) & 0x0000_0000_F0F0_F0F0;
    x ^= t ^ (t << 28);
    x
}

#[inline]
fn groups(len: usize, typesize: usize) -> usize {
    (len / typesize) / 8
}

fn copy_tail(src: &[u8], dst: &mut [u8], typesize: usize) {
    let tail = groups(src.len(), typesize) * 8 * typesize;
    dst[tail..].copy_from_slice(&src[tail..]);
}

pub(crate) fn bitshuffle_scalar(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let g = groups(src.len(), typesize);
    for p in 0..typesize {
        let j = order.byte_index(p, typesize);
        for b in 0..8 {
            let row = (p * 8 + b) * g;
            for k in 0..g {
                let mut byte = 0u8;
                for r in 0..8 {
                    let bit = (src[(8 * k + r) * typesize + j] >> b) & 1;
                    byte |= bit << r;
                }
                dst[row + k] = byte;
            }
        }
    }
    copy_tail(src, dst, typesize);
}

pub(crate) fn bitunshuffle_scalar(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let g = groups(src.len(), typesize);
    dst[..g * 8 * typesize].fill(0);
    for p in 0..typesize {
        let j = order.byte_index(p, typesize);
        for b in 0..8 {
            let row = (p * 8 + b) * g;
            for k in 0..g {
                let byte = src[row + k];
                for r in 0..8 {
                    dst[(8 * k + r) * typesize + j] |= ((byte >> r) & 1) << b;
                }
            }
        }
    }
    copy_tail(src, dst, typesize);
}

pub(crate) fn bitshuffle_wide(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let g = groups(src.len(), typesize);
    for p in 0..typesize {
        let j = order.byte_index(p, typesize);
        for k in 0..g {
            let mut x = 0u64;
            for r in 0..8 {
                x |= (src[(8 * k + r) * typesize + j] as u64) << (8 * r);
            }
            let t = transpose8(x);
            for b in 0..8 {
                dst[(p * 8 + b) * g + k] = (t >> (8 * b)) as u8;
            }
        }
    }
    copy_tail(src, dst, typesize);
}

pub(crate) fn bitunshuffle_wide(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let g = groups(src.len(), typesize);
    for p in 0..typesize {
        let j = order.byte_index(p, typesize);
        for k in 0..g {
            let mut x = 0u64;
            for b in 0..8 {
                x |= (src[(p * 8 + b) * g + k] as u64) << (8 * b);
            }
            let t = transpose8(x);
            for r in 0..8 {
                dst[(8 * k + r) * typesize + j] = (t >> (8 * r)) as u8;
            }
        }
    }
    copy_tail(src, dst, typesize);
}
