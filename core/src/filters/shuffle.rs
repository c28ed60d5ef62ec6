//! filters/shuffle.rs
//! Byte shuffle: plane p holds the significance-p byte of every element.
//!
//! Callers guarantee `src.len() == dst.len()` and a whole number of elements.

use crate::filters::ByteOrder;

pub(crate) fn shuffle_scalar(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let n = src.len() / typesize;
    for plane in 0..typesize {
        let j = order.byte_index(plane, typesize);
        for i in 0..n {
            dst[plane * n + i] = src[i * typesize + j];
        }
    }
}

pub(crate) fn unshuffle_scalar(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let n = src.len() / typesize;
    for plane in 0..typesize {
        let j = order.byte_index(plane, typesize);
        for i in 0..n {
            dst[i * typesize + j] = src[plane * n + i];
        }
    }
}

pub(crate) fn shuffle_wide(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    if src.is_empty() {
        return;
    }
    match typesize {
        2 => shuffle_fixed::<2>(src, dst, order),
        4 => shuffle_fixed::<4>(src, dst, order),
        8 => shuffle_fixed::<8>(src, dst, order),
        16 => shuffle_fixed::<16>(src, dst, order),
        _ => shuffle_elements(src, dst, typesize, order),
    }
}

pub(crate) fn unshuffle_wide(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    if src.is_empty() {
        return;
    }
    match typesize {
        2 => unshuffle_fixed::<2>(src, dst, order),
        4 => unshuffle_fixed::<4>(src, dst, order),
        8 => unshuffle_fixed::<8>(src, dst, order),
        16 => unshuffle_fixed::<16>(src, dst, order),
        _ => unshuffle_elements(src, dst, typesize, order),
    }
}

// Element-major traversal: one pass over the input, scattering into planes.
fn shuffle_fixed<const N: usize>(src: &[u8], dst: &mut [u8], order: ByteOrder) {
    let n = src.len() / N;
    let map: [usize; N] = std::array::from_fn(|p| order.byte_index(p, N));
    let mut planes: Vec<&mut [u8]> = dst.chunks_exact_mut(n).collect();
    for (i, elem) in src.chunks_exact(N).enumerate() {
        for p in 0..N {
            planes[p][i] = elem[map[p]];
        }
    }
}

fn unshuffle_fixed<const N: usize>(src: &[u8], dst: &mut [u8], order: ByteOrder) {
    let n = src.len() / N;
    let map: [usize; N] = std::array::from_fn(|p| order.byte_index(p, N));
    let planes: Vec<&[u8]> = src.chunks_exact(n).collect();
    for (i, elem) in dst.chunks_exact_mut(N).enumerate() {
        for p in 0..N {
            elem[map[p]] = planes[p][i];
        }
    }
}

fn shuffle_elements(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let n = src.len() / typesize;
    let map: Vec<usize> = (0..typesize).map(|p| order.byte_index(p, typesize)).collect();
    let mut planes: Vec<&mut [u8]> = dst.chunks_exact_mut(n).collect();
    for (i, elem) in src.chunks_exact(typesize).enumerate() {
        for (plane, &j) in planes.iter_mut().zip(&map) {
            plane[i] = elem[j];
        }
    }
}

fn unshuffle_elements(src: &[u8], dst: &mut [u8], typesize: usize, order: ByteOrder) {
    let n = src.len() / typesize;
    let map: Vec<usize> = (0..typesize).map(|p| order.byte_index(p, typesize)).collect();
    let planes: Vec<&[u8]> = src.chunks_exact(n).collect();
    for (i, elem) in dst.chunks_exact_mut(typesize).enumerate() {
        for (plane, &j) in planes.iter().zip(&map) {
            elem[j] = plane[i];
        }
    }
}
