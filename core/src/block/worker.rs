//! Per-block compress and decompress jobs.
//!
//! A block is split into a whole-element body, which goes through the
//! filter, and a trailing partial element (only possible on the last block),
//! which is appended unfiltered.

use std::borrow::Cow;
use std::time::Instant;

use crate::compression::{registry, CodecOutcome, CompressionCodec};
use crate::config::CompressionContext;
use crate::filters::{self, ByteOrder, FilterKind};
use crate::frame::BlockDescriptor;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::Result;
use crate::utils::compute_checksum;

/// Output of one block compression job.
#[derive(Debug)]
pub(crate) struct CompressedBlock {
    pub descriptor: BlockDescriptor,
    pub payload: Vec<u8>,
    pub counters: TelemetryCounters,
    pub times: StageTimes,
}

/// Telemetry of one block decompression job.
#[derive(Debug, Default)]
pub(crate) struct BlockStats {
    pub counters: TelemetryCounters,
    pub times: StageTimes,
}

/// Everything a worker needs to compress a block, copied out of the context.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockPlan {
    codec: CompressionCodec,
    level: u8,
    filter: FilterKind,
    typesize: usize,
    order: ByteOrder,
    checksum: bool,
}

impl BlockPlan {
    pub fn new(ctx: &CompressionContext) -> Self {
        Self {
            codec: ctx.codec(),
            level: ctx.level(),
            filter: ctx.filter(),
            typesize: ctx.typesize(),
            order: ctx.byte_order(),
            checksum: ctx.checksum(),
        }
    }

    pub fn compress(&self, input: &[u8]) -> Result<CompressedBlock> {
        let mut times = StageTimes::default();

        let t = Instant::now();
        let filtered = self.filter_block(input)?;
        if self.filter != FilterKind::None {
            times.add(Stage::Filter, t.elapsed());
        }

        let t = Instant::now();
        let outcome = registry::compress(self.codec, &filtered, self.level)?;
        times.add(Stage::Compress, t.elapsed());

        let (codec, filter, payload, stored_raw) = match outcome {
            CodecOutcome::Compressed(bytes) => (self.codec, self.filter, bytes, false),
            // raw-stored blocks keep the unfiltered bytes
            CodecOutcome::StoredRaw => (CompressionCodec::Stored, FilterKind::None, input.to_vec(), true),
        };

        let checksum = if self.checksum {
            let t = Instant::now();
            let crc = compute_checksum(&payload);
            times.add(Stage::Checksum, t.elapsed());
            Some(crc)
        } else {
            None
        };

        let mut counters = TelemetryCounters::default();
        counters.add_block(input.len(), payload.len(), stored_raw);

        Ok(CompressedBlock {
            descriptor: BlockDescriptor {
                codec,
                filter,
                compressed_len: payload.len() as u32,
                uncompressed_len: input.len() as u32,
                checksum,
                offset: 0,
            },
            payload,
            counters,
            times,
        })
    }

    fn filter_block<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        if self.filter == FilterKind::None {
            return Ok(Cow::Borrowed(input));
        }
        let body_len = input.len() - input.len() % self.typesize;
        let (body, tail) = input.split_at(body_len);
        let mut out = filters::apply_ordered(self.filter, body, self.typesize, self.order)?;
        out.extend_from_slice(tail);
        Ok(Cow::Owned(out))
    }
}

/// Decode one block into `out`, which is exactly the block's uncompressed
/// length.
pub(crate) fn decompress_block_into(
    desc: &BlockDescriptor,
    payload: &[u8],
    typesize: usize,
    order: ByteOrder,
    out: &mut [u8],
) -> Result<BlockStats> {
    let mut stats = BlockStats::default();
    stats.counters.add_block(out.len(), payload.len(), desc.is_stored());

    if desc.filter == FilterKind::None {
        let t = Instant::now();
        registry::decompress_into(desc.codec, payload, out)?;
        stats.times.add(Stage::Decompress, t.elapsed());
        return Ok(stats);
    }

    let t = Instant::now();
    let filtered = registry::decompress(desc.codec, payload, out.len())?;
    stats.times.add(Stage::Decompress, t.elapsed());

    let t = Instant::now();
    let body_len = out.len() - out.len() % typesize;
    let body = filters::invert_ordered(desc.filter, &filtered[..body_len], typesize, order)?;
    out[..body_len].copy_from_slice(&body);
    out[body_len..].copy_from_slice(&filtered[body_len..]);
    stats.times.add(Stage::Unfilter, t.elapsed());

    Ok(stats)
}
