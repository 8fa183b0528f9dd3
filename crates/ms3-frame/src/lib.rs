//! Streaming decoder and encoder for the MS3 wire format.
//!
//! MS3 is a length-prefixed, CRC-32-protected binary message format carried
//! over unreliable byte streams (serial links, sockets) that deliver data in
//! arbitrary chunk sizes. Every frame is:
//! - a 2-byte big-endian payload length (covering flag+body only)
//! - a 1-byte flag (message-type discriminator)
//! - the body
//! - a 4-byte big-endian CRC-32 over flag+body
//!
//! [`StreamDecoder`] reassembles arbitrarily-chunked input into validated
//! messages, resynchronizing past corrupt framing instead of failing.

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod reader;

pub use checksum::{checksum, crc32};
pub use codec::{
    encode_command, encode_frame, CHECKSUM_SIZE, FLAG_SIZE, LENGTH_SIZE, MAX_PAYLOAD,
    MAX_WIRE_SIZE, MIN_PAYLOAD, MIN_WIRE_SIZE,
};
pub use decoder::{DecoderConfig, DecoderStats, StreamDecoder, DEFAULT_MAX_BUFFER};
pub use error::{FrameError, Result};
pub use reader::MessageReader;
