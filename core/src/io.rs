//! io.rs
//! Frames over `Read`/`Write`: one frame per chunk, written back to back.

use std::io::{Read, Write};

use bytes::Bytes;
use tracing::debug;

use crate::block::{compress_with_telemetry, decompress_bytes_with_telemetry};
use crate::config::CompressionContext;
use crate::constants::DEFAULT_STREAM_CHUNK;
use crate::frame::{deserialize_bytes, frame_info, parse_header, Frame, FrameError, FrameHeader};
use crate::telemetry::TelemetrySnapshot;
use crate::types::Result;

/// Read until `buf` is full or the reader is exhausted; returns bytes read.
pub fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(off)
}

/// Append bytes from `r` until `wire` holds `need_total`. The buffer grows
/// only as bytes arrive, so a length declared by a corrupt header cannot
/// force an allocation the stream does not back.
fn read_to<R: Read>(r: &mut R, wire: &mut Vec<u8>, need_total: usize) -> Result<()> {
    let want = need_total.saturating_sub(wire.len()) as u64;
    r.by_ref().take(want).read_to_end(wire)?;
    if wire.len() < need_total {
        return Err(FrameError::TruncatedInput { need: need_total, have: wire.len() }.into());
    }
    Ok(())
}

/// Read the raw bytes of the next frame. `None` on a clean EOF at a frame
/// boundary.
fn read_frame_wire<R: Read>(r: &mut R) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; FrameHeader::LEN];
    let n = read_exact_or_eof(r, &mut header)?;
    if n == 0 {
        return Ok(None);
    }
    if n < FrameHeader::LEN {
        return Err(FrameError::TruncatedInput { need: FrameHeader::LEN, have: n }.into());
    }

    let parsed = parse_header(&header)?;
    let table_end = FrameHeader::LEN + parsed.descriptor_table_len();
    let mut wire = header.to_vec();
    read_to(r, &mut wire, table_end)?;

    let frame_len = frame_info(&wire)?.frame_len;
    read_to(r, &mut wire, frame_len)?;
    Ok(Some(wire))
}

pub fn write_frame<W: Write>(w: &mut W, frame: &Frame) -> Result<()> {
    w.write_all(&frame.to_bytes())?;
    Ok(())
}

/// Read the next frame from `r`.
///
/// Returns `None` on EOF at a frame boundary; EOF inside a frame is
/// `TruncatedInput`.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<Frame>> {
    match read_frame_wire(r)? {
        Some(wire) => Ok(Some(deserialize_bytes(Bytes::from(wire))?)),
        None => Ok(None),
    }
}

/// Compress everything `reader` yields, one frame per `chunk_len` bytes.
/// `chunk_len == 0` selects the default chunk length.
pub fn compress_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    ctx: &CompressionContext,
    chunk_len: usize,
) -> Result<TelemetrySnapshot> {
    let chunk_len = if chunk_len == 0 { DEFAULT_STREAM_CHUNK } else { chunk_len };
    let mut buf = vec![0u8; chunk_len];
    let mut total = TelemetrySnapshot::empty();

    loop {
        let n = read_exact_or_eof(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        let (frame, snapshot) = compress_with_telemetry(&buf[..n], ctx)?;
        write_frame(&mut writer, &frame)?;
        total = total.merge(&snapshot);
        if n < chunk_len {
            break;
        }
    }
    writer.flush()?;

    debug!(frames = total.frames, bytes = total.bytes_uncompressed, "stream compressed");
    Ok(total)
}

/// Decompress a sequence of frames from `reader` into `writer`.
pub fn decompress_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    threads: usize,
) -> Result<TelemetrySnapshot> {
    let mut total = TelemetrySnapshot::empty();

    while let Some(wire) = read_frame_wire(&mut reader)? {
        let (out, snapshot) = decompress_bytes_with_telemetry(&wire, threads)?;
        writer.write_all(&out)?;
        total = total.merge(&snapshot);
    }
    writer.flush()?;

    debug!(frames = total.frames, bytes = total.bytes_uncompressed, "stream decompressed");
    Ok(total)
}
