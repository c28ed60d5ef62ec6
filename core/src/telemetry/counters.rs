//! telemetry/counters.rs
//! Per-operation byte and block counters.
//!
//! Each worker fills its own `TelemetryCounters`; the collector merges them
//! in block order, so no counter is ever shared between threads.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub blocks: u64,
    /// Blocks kept verbatim by the raw-store policy.
    pub blocks_stored: u64,
    pub bytes_uncompressed: u64,
    /// Stored block payload bytes, excluding header and descriptors.
    pub bytes_compressed: u64,
    /// Header and descriptor table bytes.
    pub bytes_overhead: u64,
    pub frames: u64,
}

impl TelemetryCounters {
    /// Record one block.
    pub fn add_block(&mut self, uncompressed_len: usize, stored_len: usize, stored_raw: bool) {
        self.blocks += 1;
        if stored_raw {
            self.blocks_stored += 1;
        }
        self.bytes_uncompressed += uncompressed_len as u64;
        self.bytes_compressed += stored_len as u64;
    }

    /// Record one frame's header and descriptor table.
    pub fn add_frame(&mut self, overhead_len: usize) {
        self.frames += 1;
        self.bytes_overhead += overhead_len as u64;
    }

    /// Total bytes on the wire.
    pub fn bytes_encoded(&self) -> u64 {
        self.bytes_compressed + self.bytes_overhead
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.blocks += other.blocks;
        self.blocks_stored += other.blocks_stored;
        self.bytes_uncompressed += other.bytes_uncompressed;
        self.bytes_compressed += other.bytes_compressed;
        self.bytes_overhead += other.bytes_overhead;
        self.frames += other.frames;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
