//! codecs/lzd.rs
//! Internal default codec: byte-oriented LZ77 with an 8 KiB window.
//!
//! Stream grammar, one control byte followed by operands:
//!
//! ```text
//! 000lllll                          literal run of l+1 bytes (1..=32)
//! mmmddddd dddddddd                 match, length m+2 (m in 1..=6), distance d+1
//! 111ddddd [0xff]* x dddddddd       match, length 9+sum(ext), distance d+1
//! ```
//!
//! There is no end marker; the decoder stops when input is exhausted and then
//! checks that exactly the expected number of bytes was produced.

use crate::compression::constants::default_codec_hash_log;
use crate::compression::types::{BlockCodec, CompressionCodec, CompressionError};

const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 1 << 16;
const MAX_DISTANCE: usize = 1 << 13;
const MAX_LITERAL_RUN: usize = 32;
const EXTENDED_MATCH: u8 = 7;

pub struct DefaultCodec;

impl BlockCodec for DefaultCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Default
    }

    fn compress_block(&self, input: &[u8], level: u8, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        encode(input, default_codec_hash_log(level), out);
        Ok(())
    }

    fn decompress_block(&self, input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
        decode(input, out)
    }
}

#[inline(always)]
fn read3(data: &[u8], pos: usize) -> u32 {
    data[pos] as u32 | (data[pos + 1] as u32) << 8 | (data[pos + 2] as u32) << 16
}

#[inline(always)]
fn hash3(v: u32, hash_log: u32) -> usize {
    (v.wrapping_mul(2_654_435_761) >> (32 - hash_log)) as usize
}

pub(crate) fn encode(input: &[u8], hash_log: u32, out: &mut Vec<u8>) {
    let len = input.len();
    // Slots hold position + 1 so zero means empty.
    let mut table = vec![0usize; 1 << hash_log];
    let mut anchor = 0;
    let mut ip = 0;

    while ip + MIN_MATCH <= len {
        let h = hash3(read3(input, ip), hash_log);
        let candidate = table[h];
        table[h] = ip + 1;

        if candidate != 0 {
            let r = candidate - 1;
            let distance = ip - r;
            if distance <= MAX_DISTANCE && input[r..r + MIN_MATCH] == input[ip..ip + MIN_MATCH] {
                let limit = (len - ip).min(MAX_MATCH);
                let mut match_len = MIN_MATCH;
                while match_len < limit && input[r + match_len] == input[ip + match_len] {
                    match_len += 1;
                }

                emit_literals(&input[anchor..ip], out);
                emit_match(match_len, distance, out);

                ip += match_len;
                anchor = ip;
                continue;
            }
        }
        ip += 1;
    }

    emit_literals(&input[anchor..], out);
}

fn emit_literals(literals: &[u8], out: &mut Vec<u8>) {
    for run in literals.chunks(MAX_LITERAL_RUN) {
        out.push((run.len() - 1) as u8);
        out.extend_from_slice(run);
    }
}

fn emit_match(match_len: usize, distance: usize, out: &mut Vec<u8>) {
    let d = distance - 1;
    let hi = (d >> 8) as u8;
    let m = match_len - 2;

    if m < EXTENDED_MATCH as usize {
        out.push(((m as u8) << 5) | hi);
    } else {
        out.push((EXTENDED_MATCH << 5) | hi);
        let mut rest = m - EXTENDED_MATCH as usize;
        while rest >= 255 {
            out.push(255);
            rest -= 255;
        }
        out.push(rest as u8);
    }
    out.push((d & 0xff) as u8);
}

fn corrupt(msg: &str) -> CompressionError {
    CompressionError::failure(CompressionCodec::Default, msg)
}

pub(crate) fn decode(input: &[u8], out: &mut [u8]) -> Result<(), CompressionError> {
    let mut ip = 0;
    let mut op = 0;

    while ip < input.len() {
        let ctrl = input[ip];
        ip += 1;
        let kind = ctrl >> 5;

        if kind == 0 {
            let run = (ctrl & 0x1f) as usize + 1;
            let src = input
                .get(ip..ip + run)
                .ok_or_else(|| corrupt("literal run past end of input"))?;
            let dst = out
                .get_mut(op..op + run)
                .ok_or_else(|| corrupt("literal run past end of output"))?;
            dst.copy_from_slice(src);
            ip += run;
            op += run;
            continue;
        }

        let mut m = kind as usize;
        if kind == EXTENDED_MATCH {
            loop {
                let ext = *input.get(ip).ok_or_else(|| corrupt("truncated match length"))?;
                ip += 1;
                m += ext as usize;
                if ext != 255 {
                    break;
                }
            }
        }
        let lo = *input.get(ip).ok_or_else(|| corrupt("truncated match distance"))?;
        ip += 1;

        let distance = ((((ctrl & 0x1f) as usize) << 8) | lo as usize) + 1;
        let match_len = m + 2;
        if distance > op {
            return Err(corrupt("match reaches before start of output"));
        }
        if op + match_len > out.len() {
            return Err(corrupt("match past end of output"));
        }

        // Byte-wise copy: source and destination may overlap.
        let start = op - distance;
        for k in 0..match_len {
            out[op + k] = out[start + k];
        }
        op += match_len;
    }

    if op != out.len() {
        return Err(CompressionError::SizeMismatch {
            codec: CompressionCodec::Default.name(),
            expected: out.len(),
            actual: op,
        });
    }
    Ok(())
}
