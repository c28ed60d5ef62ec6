// Telemetry: counters, stage times and snapshots produced by compress and
// decompress.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blocz_core::block::{compress_with_telemetry, decompress_bytes_with_telemetry, decompress_with_telemetry};
    use blocz_core::config::{BlockSize, CompressionContext};
    use blocz_core::frame::FrameHeader;
    use blocz_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    fn series(n: usize) -> Vec<u8> {
        let values: Vec<u32> = (0..n as u32).map(|i| i / 4).collect();
        bytemuck::cast_slice(&values).to_vec()
    }

    fn ctx(threads: usize) -> CompressionContext {
        CompressionContext::builder()
            .typesize(4)
            .block_size(BlockSize::Fixed(8192))
            .threads(threads)
            .checksum(true)
            .build()
            .unwrap()
    }

    // ------------------------------------------------------------
    // counters
    // ------------------------------------------------------------

    #[test]
    fn counters_merge_and_add() {
        let mut a = TelemetryCounters::default();
        a.add_block(100, 40, false);
        let mut b = TelemetryCounters::default();
        b.add_block(50, 50, true);
        b.add_frame(24);

        a += b;
        assert_eq!(a.blocks, 2);
        assert_eq!(a.blocks_stored, 1);
        assert_eq!(a.bytes_uncompressed, 150);
        assert_eq!(a.bytes_compressed, 90);
        assert_eq!(a.bytes_encoded(), 114);
        assert_eq!(a.frames, 1);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut t = StageTimes::default();
        t.add(Stage::Compress, Duration::from_micros(10));
        t.add(Stage::Compress, Duration::from_micros(5));
        t.add(Stage::Filter, Duration::from_micros(1));
        assert_eq!(t.get(Stage::Compress), Duration::from_micros(15));
        assert_eq!(t.total(), Duration::from_micros(16));
        assert!(t.has_all(&[Stage::Compress, Stage::Filter]));
        assert!(!t.has_all(&[Stage::Parse]));
    }

    #[test]
    fn timer_charges_closures_to_stages() {
        let mut timer = TelemetryTimer::new();
        let v = timer.time(Stage::Checksum, || 7);
        timer.finish();
        assert_eq!(v, 7);
        assert!(timer.stage_times.has_all(&[Stage::Checksum]));
        assert!(timer.elapsed() >= timer.stage_times.total());
    }

    // ------------------------------------------------------------
    // snapshots from real operations
    // ------------------------------------------------------------

    #[test]
    fn compress_snapshot_describes_frame() {
        let data = series(20_000);
        let (frame, snap) = compress_with_telemetry(&data, &ctx(3)).unwrap();

        assert_eq!(snap.frames, 1);
        assert_eq!(snap.blocks as usize, frame.block_count());
        assert_eq!(snap.bytes_uncompressed as usize, data.len());
        assert_eq!(snap.bytes_compressed as usize, frame.payload().len());
        assert_eq!(
            snap.bytes_overhead as usize,
            FrameHeader::LEN + frame.header().descriptor_table_len()
        );
        assert_eq!(snap.output_bytes() as usize, frame.encoded_len());
        assert!(snap.compression_ratio < 1.0);
        assert!(snap.has_all_stages(&[Stage::Filter, Stage::Compress, Stage::Checksum, Stage::Serialize]));
    }

    #[test]
    fn decompress_snapshots_cover_decode_stages() {
        let data = series(20_000);
        let (frame, _) = compress_with_telemetry(&data, &ctx(1)).unwrap();

        let (out, snap) = decompress_with_telemetry(&frame, 2).unwrap();
        assert_eq!(out, data);
        assert!(snap.has_all_stages(&[Stage::Checksum, Stage::Decompress, Stage::Unfilter]));

        let (out, snap) = decompress_bytes_with_telemetry(&frame.to_bytes(), 2).unwrap();
        assert_eq!(out, data);
        assert!(snap.has_all_stages(&[Stage::Parse, Stage::Decompress, Stage::Unfilter]));
        assert_eq!(snap.blocks as usize, frame.block_count());
    }

    #[test]
    fn snapshots_merge() {
        let data = series(5_000);
        let (_, a) = compress_with_telemetry(&data, &ctx(1)).unwrap();
        let (_, b) = compress_with_telemetry(&data, &ctx(1)).unwrap();
        let merged = TelemetrySnapshot::empty().merge(&a).merge(&b);
        assert_eq!(merged.frames, 2);
        assert_eq!(merged.bytes_uncompressed, a.bytes_uncompressed * 2);
        assert_eq!(merged.elapsed, a.elapsed + b.elapsed);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let (_, snap) = compress_with_telemetry(&series(1000), &ctx(1)).unwrap();
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"bytes_uncompressed\":4000"));
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.blocks, snap.blocks);
    }
}
