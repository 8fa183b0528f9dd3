//! CRC-32 integrity codes for MS3 payloads.
//!
//! MS3 protects every frame with standard CRC-32 (the ISO-HDLC polynomial,
//! the same algorithm `cksum`-style tools and zlib implement) over the
//! flag+body payload, serialized big-endian on the wire.

use crc::{Crc, CRC_32_ISO_HDLC};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// CRC-32 of `data` as a 32-bit value.
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// CRC-32 of `data`, serialized big-endian as it appears on the wire.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    crc32(data).to_be_bytes()
}

/// CRC-32 of `flag` followed by `body`, without materializing the
/// concatenated payload.
pub fn crc32_payload(flag: u8, body: &[u8]) -> u32 {
    let mut digest = CRC32.digest();
    digest.update(&[flag]);
    digest.update(body);
    digest.finalize()
}
