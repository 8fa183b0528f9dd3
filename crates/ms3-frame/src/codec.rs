use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::crc32_payload;
use crate::error::{FrameError, Result};

/// Size of the leading payload-length field.
pub const LENGTH_SIZE: usize = 2;

/// Size of the flag byte that opens every payload.
pub const FLAG_SIZE: usize = 1;

/// Size of the trailing CRC-32 field.
pub const CHECKSUM_SIZE: usize = 4;

/// Minimum declared payload length: flag + at least one body byte.
pub const MIN_PAYLOAD: usize = 2;

/// Smallest complete frame on the wire: length (2) + flag (1) + body (1) + CRC (4).
pub const MIN_WIRE_SIZE: usize = LENGTH_SIZE + MIN_PAYLOAD + CHECKSUM_SIZE;

/// Largest payload the 2-byte length field can declare.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Largest possible frame on the wire.
pub const MAX_WIRE_SIZE: usize = LENGTH_SIZE + MAX_PAYLOAD + CHECKSUM_SIZE;

/// Encode a frame into the wire format.
///
/// Wire format (all integers big-endian):
/// ```text
/// ┌─────────────┬──────────┬────────────────┬──────────────────┐
/// │ Length (2B) │ Flag (1B)│ Body           │ CRC-32 (4B)      │
/// │ flag+body   │          │ (Length-1 B)   │ over flag+body   │
/// └─────────────┴──────────┴────────────────┴──────────────────┘
/// ```
///
/// The body must be non-empty: a flag-only payload (`Length = 1`) is below
/// the decoder's minimum and would be skipped as corrupt framing. Outbound
/// flag-only commands use [`encode_command`] instead.
pub fn encode_frame(flag: u8, body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.is_empty() {
        return Err(FrameError::EmptyBody);
    }
    let payload_len = FLAG_SIZE + body.len();
    if payload_len > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(LENGTH_SIZE + payload_len + CHECKSUM_SIZE);
    dst.put_u16(payload_len as u16);
    dst.put_u8(flag);
    dst.put_slice(body);
    dst.put_u32(crc32_payload(flag, body));
    Ok(())
}

/// Encode a flag-only outbound command frame.
///
/// Commands sent to the device carry no body, so the declared payload length
/// is 1 — intentionally below [`MIN_PAYLOAD`]. The device-side parser accepts
/// flag-only frames; [`StreamDecoder`](crate::StreamDecoder) (device→host
/// direction) does not, and will resync past one.
pub fn encode_command(flag: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(LENGTH_SIZE + FLAG_SIZE + CHECKSUM_SIZE);
    buf.put_u16(FLAG_SIZE as u16);
    buf.put_u8(flag);
    buf.put_u32(crc32_payload(flag, &[]));
    buf.freeze()
}
