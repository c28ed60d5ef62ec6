// Streaming: frames written back to back over Read/Write.

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use blocz_core::config::{BlockSize, CompressionContext};
    use blocz_core::frame::{encode_header, FrameError, FrameFlags, FrameHeader};
    use blocz_core::io::{compress_stream, decompress_stream, read_frame, write_frame};
    use blocz_core::types::BloczError;

    fn data(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i / 16) % 251) as u8).collect()
    }

    fn ctx() -> CompressionContext {
        CompressionContext::builder()
            .typesize(4)
            .block_size(BlockSize::Fixed(4096))
            .threads(2)
            .build()
            .unwrap()
    }

    // ------------------------------------------------------------
    // stream round trip
    // ------------------------------------------------------------

    #[test]
    fn stream_roundtrip_in_chunks() {
        let input = data(35_000);
        let mut wire = Vec::new();
        let snap = compress_stream(Cursor::new(&input), &mut wire, &ctx(), 10_000).unwrap();
        assert_eq!(snap.frames, 4);
        assert_eq!(snap.bytes_uncompressed, 35_000);
        assert_eq!(snap.output_bytes() as usize, wire.len());

        let mut out = Vec::new();
        let back = decompress_stream(Cursor::new(&wire), &mut out, 2).unwrap();
        assert_eq!(out, input);
        assert_eq!(back.frames, 4);
    }

    #[test]
    fn exact_chunk_multiple() {
        let input = data(20_000);
        let mut wire = Vec::new();
        let snap = compress_stream(Cursor::new(&input), &mut wire, &ctx(), 10_000).unwrap();
        assert_eq!(snap.frames, 2);

        let mut out = Vec::new();
        decompress_stream(Cursor::new(&wire), &mut out, 1).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn empty_stream() {
        let mut wire = Vec::new();
        let snap = compress_stream(Cursor::new(Vec::<u8>::new()), &mut wire, &ctx(), 0).unwrap();
        assert_eq!(snap.frames, 0);
        assert!(wire.is_empty());

        let mut out = Vec::new();
        decompress_stream(Cursor::new(&wire), &mut out, 1).unwrap();
        assert!(out.is_empty());
    }

    // ------------------------------------------------------------
    // frame-level reads
    // ------------------------------------------------------------

    #[test]
    fn read_frames_until_clean_eof() {
        let a = blocz_core::block::compress(&data(5000), &ctx()).unwrap();
        let b = blocz_core::block::compress(&data(300), &ctx()).unwrap();

        let mut wire = Vec::new();
        write_frame(&mut wire, &a).unwrap();
        write_frame(&mut wire, &b).unwrap();

        let mut reader = Cursor::new(&wire);
        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), a);
        assert_eq!(read_frame(&mut reader).unwrap().unwrap(), b);
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn eof_inside_frame_is_truncated() {
        let frame = blocz_core::block::compress(&data(5000), &ctx()).unwrap();
        let wire = frame.to_bytes();

        for cut in [3, 30, wire.len() - 1] {
            let mut reader = Cursor::new(&wire[..cut]);
            let err = read_frame(&mut reader).unwrap_err();
            assert!(
                matches!(err, BloczError::CorruptFrame(FrameError::TruncatedInput { .. })),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn huge_descriptor_table_is_read_lazily() {
        // Valid header declaring u32::MAX one-byte blocks, then nothing else.
        let header = FrameHeader {
            flags: FrameFlags::empty(),
            typesize: 1,
            uncompressed_size: u32::MAX as u64,
            block_size: 1,
            block_count: u32::MAX,
        };
        let wire = encode_header(&header);

        let err = read_frame(&mut Cursor::new(&wire)).unwrap_err();
        assert!(matches!(
            err,
            BloczError::CorruptFrame(FrameError::TruncatedInput { have, .. }) if have == FrameHeader::LEN
        ));

        let mut out = Vec::new();
        assert!(decompress_stream(Cursor::new(&wire), &mut out, 1).unwrap_err().is_corrupt_input());
    }

    #[test]
    fn garbage_between_frames_is_rejected() {
        let frame = blocz_core::block::compress(&data(1000), &ctx()).unwrap();
        let mut wire = frame.to_bytes();
        wire.extend_from_slice(&[0u8; 32]);

        let mut out = Vec::new();
        let err = decompress_stream(Cursor::new(&wire), &mut out, 1).unwrap_err();
        assert!(err.is_corrupt_input());
    }
}
