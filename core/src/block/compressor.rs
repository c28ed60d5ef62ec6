//! Chunked block compressor.
//!
//! Splits a buffer into blocks, runs each block through the filter and codec
//! on the dispatcher, and assembles the frame in block order. Decompression
//! writes every block straight into its own slice of the output buffer.

use std::time::Instant;

use tracing::debug;

use crate::block::worker::{decompress_block_into, BlockPlan, BlockStats};
use crate::config::{CompressionContext, ConfigError};
use crate::dispatch;
use crate::frame::{BlockDescriptor, Frame, FrameFlags, FrameHeader, FrameView};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{BloczError, Result};
use crate::utils::{block_count, try_zeroed};

/// Compress `input` into a frame.
pub fn compress(input: &[u8], ctx: &CompressionContext) -> Result<Frame> {
    compress_with_telemetry(input, ctx).map(|(frame, _)| frame)
}

pub fn compress_with_telemetry(
    input: &[u8],
    ctx: &CompressionContext,
) -> Result<(Frame, TelemetrySnapshot)> {
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();

    let block_size = ctx.block_size_for(input.len());
    let blocks = u32::try_from(block_count(input.len(), block_size))
        .map_err(|_| ConfigError::InputTooLarge { len: input.len() })?;

    let mut flags = FrameFlags::from_filter(ctx.filter()) | FrameFlags::from_byte_order(ctx.byte_order());
    if ctx.checksum() {
        flags |= FrameFlags::CHECKSUM;
    }
    let header = FrameHeader {
        flags,
        typesize: ctx.typesize() as u8,
        uncompressed_size: input.len() as u64,
        block_size: block_size as u32,
        block_count: blocks,
    };

    let plan = BlockPlan::new(ctx);
    let jobs: Vec<&[u8]> = input.chunks(block_size).collect();
    let results = dispatch::run(jobs, ctx.threads(), |_, block| plan.compress(block))?;

    let mut parts: Vec<(BlockDescriptor, Vec<u8>)> = Vec::with_capacity(results.len());
    for block in results {
        counters.merge(&block.counters);
        timer.stage_times.merge(&block.times);
        parts.push((block.descriptor, block.payload));
    }

    let t = Instant::now();
    let frame = Frame::assemble(header, parts)?;
    timer.add_stage_time(Stage::Serialize, t.elapsed());
    counters.add_frame(FrameHeader::LEN + header.descriptor_table_len());
    timer.finish();

    debug!(
        len = input.len(),
        encoded = frame.encoded_len(),
        blocks,
        block_size,
        codec = %ctx.codec(),
        filter = %ctx.filter(),
        "compressed"
    );
    Ok((frame, TelemetrySnapshot::from(&counters, &timer)))
}

/// Decompress an owned frame on up to `threads` workers.
pub fn decompress(frame: &Frame, threads: usize) -> Result<Vec<u8>> {
    decompress_with_telemetry(frame, threads).map(|(out, _)| out)
}

pub fn decompress_with_telemetry(frame: &Frame, threads: usize) -> Result<(Vec<u8>, TelemetrySnapshot)> {
    let mut timer = TelemetryTimer::new();
    let view = frame.view();
    let t = Instant::now();
    view.verify_checksums()?;
    timer.add_stage_time(Stage::Checksum, t.elapsed());
    decode_view(&view, threads, timer)
}

/// Parse and decompress a serialized frame. The whole descriptor table and
/// every checksum are validated before any block is decoded.
pub fn decompress_bytes(wire: &[u8], threads: usize) -> Result<Vec<u8>> {
    decompress_bytes_with_telemetry(wire, threads).map(|(out, _)| out)
}

pub fn decompress_bytes_with_telemetry(wire: &[u8], threads: usize) -> Result<(Vec<u8>, TelemetrySnapshot)> {
    let mut timer = TelemetryTimer::new();
    let t = Instant::now();
    let view = FrameView::parse(wire)?;
    timer.add_stage_time(Stage::Parse, t.elapsed());
    decode_view(&view, threads, timer)
}

fn decode_view(
    view: &FrameView<'_>,
    threads: usize,
    mut timer: TelemetryTimer,
) -> Result<(Vec<u8>, TelemetrySnapshot)> {
    let header = view.header;
    let typesize = header.typesize as usize;
    let order = header.byte_order();

    let mut out = output_buffer(header.uncompressed_size)?;
    let jobs: Vec<(&mut [u8], &BlockDescriptor)> = out
        .chunks_mut(header.block_size as usize)
        .zip(view.descriptors.iter())
        .collect();

    let stats = dispatch::run(jobs, threads, |index, (slot, desc)| -> Result<BlockStats> {
        let payload = view.block(index).ok_or(BloczError::OutOfRange {
            start: index,
            end: index + 1,
            len: view.block_count(),
        })?;
        decompress_block_into(desc, payload, typesize, order, slot)
    })?;

    let mut counters = TelemetryCounters::default();
    for s in &stats {
        counters.merge(&s.counters);
        timer.stage_times.merge(&s.times);
    }
    counters.add_frame(FrameHeader::LEN + header.descriptor_table_len());
    timer.finish();

    Ok((out, TelemetrySnapshot::from(&counters, &timer)))
}

fn output_buffer(len: u64) -> Result<Vec<u8>> {
    let too_large = || BloczError::OutputTooLarge { bytes: len };
    let bytes = usize::try_from(len).map_err(|_| too_large())?;
    try_zeroed(bytes).map_err(|_| too_large())
}

/// Decode a single block of a parsed frame.
pub fn decompress_block(view: &FrameView<'_>, index: usize) -> Result<Vec<u8>> {
    let out_of_range = || BloczError::OutOfRange { start: index, end: index + 1, len: view.block_count() };
    let desc = view.descriptors.get(index).ok_or_else(out_of_range)?;
    let payload = view.block(index).ok_or_else(out_of_range)?;

    let mut out = output_buffer(desc.uncompressed_len as u64)?;
    decompress_block_into(
        desc,
        payload,
        view.header.typesize as usize,
        view.header.byte_order(),
        &mut out,
    )?;
    Ok(out)
}

/// Decode `count` elements starting at element `start`, touching only the
/// blocks that overlap the range.
pub fn get_items(view: &FrameView<'_>, start: usize, count: usize) -> Result<Vec<u8>> {
    let typesize = view.header.typesize as usize;
    let total = view.header.uncompressed_size as usize;

    let byte_start = start.checked_mul(typesize);
    let byte_end = start.checked_add(count).and_then(|end| end.checked_mul(typesize));
    let (byte_start, byte_end) = match (byte_start, byte_end) {
        (Some(s), Some(e)) if e <= total => (s, e),
        _ => {
            return Err(BloczError::OutOfRange {
                start,
                end: start.saturating_add(count),
                len: total / typesize,
            })
        }
    };

    let mut out = Vec::with_capacity(byte_end - byte_start);
    if byte_start == byte_end {
        return Ok(out);
    }

    let block_size = view.header.block_size as usize;
    let first = byte_start / block_size;
    let last = (byte_end - 1) / block_size;
    for index in first..=last {
        let block = decompress_block(view, index)?;
        let block_start = view.header.block_start(index);
        let lo = byte_start.max(block_start) - block_start;
        let hi = byte_end.min(block_start + block.len()) - block_start;
        out.extend_from_slice(&block[lo..hi]);
    }
    Ok(out)
}
