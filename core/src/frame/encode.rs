use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{FRAME_MAGIC, FRAME_VERSION};
use crate::frame::types::{BlockDescriptor, Frame, FrameError, FrameHeader};
use crate::frame::validate::{validate_descriptors, validate_header};

/// Encode a header into its canonical 24-byte form.
///
/// ```text
/// [ magic (4) ][ version (1) ][ flags (1) ][ typesize (1) ][ reserved (1) ]
/// [ uncompressed_size (8) ][ block_size (4) ][ block_count (4) ]
/// ```
pub fn encode_header(header: &FrameHeader) -> [u8; FrameHeader::LEN] {
    let mut out = [0u8; FrameHeader::LEN];
    out[0..4].copy_from_slice(&FRAME_MAGIC);
    out[4] = FRAME_VERSION;
    out[5] = header.flags.bits();
    out[6] = header.typesize;
    out[7] = 0;
    LittleEndian::write_u64(&mut out[8..16], header.uncompressed_size);
    LittleEndian::write_u32(&mut out[16..20], header.block_size);
    LittleEndian::write_u32(&mut out[20..24], header.block_count);
    out
}

/// Append one descriptor: codec, filter, compressed_len, uncompressed_len
/// and, when present, the CRC32 of the stored payload.
fn encode_descriptor(desc: &BlockDescriptor, out: &mut Vec<u8>) {
    let mut buf = [0u8; BlockDescriptor::LEN + BlockDescriptor::CHECKSUM_LEN];
    buf[0] = desc.codec as u8;
    buf[1] = desc.filter as u8;
    LittleEndian::write_u32(&mut buf[2..6], desc.compressed_len);
    LittleEndian::write_u32(&mut buf[6..10], desc.uncompressed_len);
    match desc.checksum {
        Some(crc) => {
            LittleEndian::write_u32(&mut buf[10..14], crc);
            out.extend_from_slice(&buf);
        }
        None => out.extend_from_slice(&buf[..BlockDescriptor::LEN]),
    }
}

/// Serialize a frame from its parts. Every structural invariant is checked
/// before anything is written.
pub fn serialize<P: AsRef<[u8]>>(
    header: &FrameHeader,
    descriptors: &[BlockDescriptor],
    payloads: &[P],
) -> Result<Vec<u8>, FrameError> {
    validate_header(header)?;
    let payload_len = validate_descriptors(header, descriptors)?;
    if payloads.len() != descriptors.len() {
        return Err(FrameError::LengthMismatch { expected: descriptors.len(), actual: payloads.len() });
    }
    for (index, (d, p)) in descriptors.iter().zip(payloads).enumerate() {
        if p.as_ref().len() != d.compressed_len as usize {
            return Err(FrameError::InvalidDescriptor { index, reason: "payload length differs from descriptor" });
        }
    }

    let expected = FrameHeader::LEN + header.descriptor_table_len() + payload_len;
    let mut out = Vec::with_capacity(expected);
    out.extend_from_slice(&encode_header(header));
    for d in descriptors {
        encode_descriptor(d, &mut out);
    }
    for p in payloads {
        out.extend_from_slice(p.as_ref());
    }

    if out.len() != expected {
        return Err(FrameError::LengthMismatch { expected, actual: out.len() });
    }
    Ok(out)
}

impl Frame {
    /// Build a frame from a validated header, descriptors (with offsets) and
    /// the concatenated payload section.
    pub fn new(
        header: FrameHeader,
        descriptors: Vec<BlockDescriptor>,
        payload: Bytes,
    ) -> Result<Self, FrameError> {
        validate_header(&header)?;
        let payload_len = validate_descriptors(&header, &descriptors)?;
        if payload.len() != payload_len {
            return Err(FrameError::LengthMismatch { expected: payload_len, actual: payload.len() });
        }
        Ok(Self { header, descriptors, payload })
    }

    /// Assemble from per-block results in block order. Offsets are assigned
    /// here; incoming descriptor offsets are ignored.
    pub fn assemble(
        header: FrameHeader,
        blocks: Vec<(BlockDescriptor, Vec<u8>)>,
    ) -> Result<Self, FrameError> {
        let total: usize = blocks.iter().map(|(_, p)| p.len()).sum();
        let mut payload = BytesMut::with_capacity(total);
        let mut descriptors = Vec::with_capacity(blocks.len());
        for (mut desc, bytes) in blocks {
            desc.offset = payload.len() as u64;
            payload.put_slice(&bytes);
            descriptors.push(desc);
        }
        Frame::new(header, descriptors, payload.freeze())
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_into(&mut out);
        out
    }

    /// Append the serialized frame to `out`.
    pub fn write_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_header(&self.header));
        for d in &self.descriptors {
            encode_descriptor(d, out);
        }
        out.extend_from_slice(&self.payload);
    }
}
