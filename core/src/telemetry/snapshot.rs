//! telemetry/snapshot.rs
//! Immutable summary of one compress/decompress operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub frames: u64,
    pub blocks: u64,
    pub blocks_stored: u64,
    pub bytes_uncompressed: u64,
    pub bytes_compressed: u64,
    pub bytes_overhead: u64,
    /// Encoded bytes over uncompressed bytes; 0 for empty input.
    pub compression_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let compression_ratio = if counters.bytes_uncompressed > 0 {
            counters.bytes_encoded() as f64 / counters.bytes_uncompressed as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_uncompressed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            frames: counters.frames,
            blocks: counters.blocks,
            blocks_stored: counters.blocks_stored,
            bytes_uncompressed: counters.bytes_uncompressed,
            bytes_compressed: counters.bytes_compressed,
            bytes_overhead: counters.bytes_overhead,
            compression_ratio,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Combine snapshots of consecutive operations (one per frame in a stream).
    pub fn merge(&self, other: &TelemetrySnapshot) -> TelemetrySnapshot {
        let mut counters = self.counters();
        counters.merge(&other.counters());
        let mut stage_times = self.stage_times.clone();
        stage_times.merge(&other.stage_times);
        let elapsed = self.elapsed + other.elapsed;

        let mut timer = TelemetryTimer::new();
        timer.stage_times = stage_times;
        let mut merged = TelemetrySnapshot::from(&counters, &timer);
        merged.elapsed = elapsed;
        merged.throughput_bytes_per_sec = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_uncompressed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        merged
    }

    pub fn empty() -> Self {
        let mut timer = TelemetryTimer::new();
        timer.end_time = Some(timer.start_time);
        TelemetrySnapshot::from(&TelemetryCounters::default(), &timer)
    }

    fn counters(&self) -> TelemetryCounters {
        TelemetryCounters {
            blocks: self.blocks,
            blocks_stored: self.blocks_stored,
            bytes_uncompressed: self.bytes_uncompressed,
            bytes_compressed: self.bytes_compressed,
            bytes_overhead: self.bytes_overhead,
            frames: self.frames,
        }
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    pub fn output_bytes(&self) -> u64 {
        self.bytes_compressed + self.bytes_overhead
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
