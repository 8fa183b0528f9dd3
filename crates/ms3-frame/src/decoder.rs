use std::collections::VecDeque;

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::checksum::crc32;
use crate::codec::{CHECKSUM_SIZE, FLAG_SIZE, LENGTH_SIZE, MIN_PAYLOAD, MIN_WIRE_SIZE};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Default cap on bytes retained between appends: 256 KiB.
///
/// The largest legal frame is 65 541 bytes, so a complete frame always fits
/// under the default bound.
pub const DEFAULT_MAX_BUFFER: usize = 256 * 1024;

/// Configuration for a [`StreamDecoder`].
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum bytes the accumulator may retain after a decode pass. When
    /// exceeded, the retained bytes are dropped and the decoder resumes from
    /// an empty buffer (already-queued messages are kept).
    pub max_buffer_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER,
        }
    }
}

/// Counters describing what a [`StreamDecoder`] has seen on its stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed CRC validation and produced a message.
    pub frames_decoded: u64,
    /// Frames whose declared extent was present but whose CRC did not match.
    pub checksum_failures: u64,
    /// Two-byte skips performed after reading an implausible length field.
    pub resync_skips: u64,
    /// Times the accumulator was dropped for exceeding the configured bound.
    pub overflow_resets: u64,
}

/// Incremental decoder for the MS3 wire format.
///
/// Feed it raw bytes in whatever chunk sizes the transport delivers;
/// it reassembles them into validated frames and queues the decoded
/// message bodies in arrival order:
///
/// ```
/// use bytes::BytesMut;
/// use ms3_frame::{encode_frame, StreamDecoder};
///
/// let mut wire = BytesMut::new();
/// encode_frame(0x01, b"telemetry", &mut wire).unwrap();
///
/// let mut decoder = StreamDecoder::new();
/// decoder.append(&wire[..5]); // partial delivery
/// assert!(!decoder.has_messages());
/// decoder.append(&wire[5..]);
/// assert_eq!(decoder.next_message().as_deref(), Some(b"telemetry".as_ref()));
/// ```
///
/// Malformed input never surfaces as an error. A frame whose full extent is
/// present but whose CRC fails is consumed and dropped; an implausible length
/// field (`payload_len < 2`) costs a two-byte skip while the decoder scans
/// for the next real frame boundary.
///
/// One decoder per logical stream. Calls must be externally serialized if
/// multiple producers or consumers share an instance.
pub struct StreamDecoder {
    buf: BytesMut,
    messages: VecDeque<Bytes>,
    config: DecoderConfig,
    stats: DecoderStats,
}

impl StreamDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            messages: VecDeque::new(),
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Append raw bytes from the stream and extract every complete frame
    /// they finish.
    ///
    /// No-op on empty input. Never blocks and never fails; any trailing
    /// incomplete frame is retained for the next call.
    pub fn append(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.buf.extend_from_slice(data);
        self.drain_frames();

        if self.buf.len() > self.config.max_buffer_size {
            warn!(
                buffered = self.buf.len(),
                max = self.config.max_buffer_size,
                "accumulator over limit, dropping buffered bytes"
            );
            self.buf.clear();
            self.stats.overflow_resets += 1;
        }
    }

    /// True iff at least one decoded message is waiting. Side-effect free.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Remove and return the oldest decoded message, or `None` when the
    /// queue is empty.
    pub fn next_message(&mut self) -> Option<Bytes> {
        self.messages.pop_front()
    }

    /// Number of decoded messages waiting in the queue.
    pub fn pending(&self) -> usize {
        self.messages.len()
    }

    /// Bytes currently retained while waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Stream counters accumulated since construction.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Decode loop: runs to fixed point over the accumulator.
    fn drain_frames(&mut self) {
        while self.buf.len() >= MIN_WIRE_SIZE {
            let payload_len = u16::from_be_bytes([self.buf[0], self.buf[1]]) as usize;
            let total = LENGTH_SIZE + payload_len + CHECKSUM_SIZE;

            if self.buf.len() < total {
                break; // Wait for the rest of the frame
            }

            if payload_len < MIN_PAYLOAD {
                // The length field itself is implausible, so its declared
                // extent cannot be trusted. Skip the two length bytes and
                // rescan from the next position.
                trace!(payload_len, "implausible length field, resyncing");
                self.buf.advance(LENGTH_SIZE);
                self.stats.resync_skips += 1;
                continue;
            }

            let payload = &self.buf[LENGTH_SIZE..LENGTH_SIZE + payload_len];
            let received = u32::from_be_bytes(
                self.buf[LENGTH_SIZE + payload_len..total].try_into().unwrap(),
            );

            if crc32(payload) == received {
                let mut frame = self.buf.split_to(total);
                frame.advance(LENGTH_SIZE + FLAG_SIZE);
                frame.truncate(payload_len - FLAG_SIZE);
                self.messages.push_back(frame.freeze());
                self.stats.frames_decoded += 1;
            } else {
                // The length field was trustworthy, so the frame's extent is
                // known; consume it whole to keep the stream moving.
                debug!(payload_len, "checksum mismatch, dropping frame");
                self.buf.advance(total);
                self.stats.checksum_failures += 1;
            }
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;

    const PAYLOAD: [u8; 7] = [0x01, 0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
    const BODY: [u8; 6] = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60];

    fn sample_frame() -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(PAYLOAD[0], &PAYLOAD[1..], &mut buf).unwrap();
        buf.to_vec()
    }

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn single_frame_decodes() {
        let mut decoder = StreamDecoder::new();
        decoder.append(&sample_frame());

        assert!(decoder.has_messages());
        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
        assert!(!decoder.has_messages());
        assert!(decoder.buffered() == 0);
    }

    #[test]
    fn empty_append_is_noop() {
        let mut decoder = StreamDecoder::new();
        decoder.append(&[]);
        assert!(!decoder.has_messages());
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn split_at_offsets_four_and_six() {
        // The worked example: deliver the frame in [0,4), [4,6), [6,..) and
        // expect the identical result as a whole-frame delivery.
        let frame = sample_frame();
        let mut decoder = StreamDecoder::new();

        decoder.append(&frame[..4]);
        assert!(!decoder.has_messages());
        decoder.append(&frame[4..6]);
        assert!(!decoder.has_messages());
        decoder.append(&frame[6..]);

        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
    }

    #[test]
    fn byte_at_a_time_delivery() {
        let frame = sample_frame();
        let mut decoder = StreamDecoder::new();
        for byte in &frame {
            decoder.append(std::slice::from_ref(byte));
        }
        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn concatenated_frames_decode_in_order() {
        let mut wire = BytesMut::new();
        encode_frame(0x01, b"first", &mut wire).unwrap();
        encode_frame(0x02, b"second", &mut wire).unwrap();
        encode_frame(0x03, b"third", &mut wire).unwrap();

        let mut decoder = StreamDecoder::new();
        decoder.append(&wire);

        assert_eq!(decoder.pending(), 3);
        assert_eq!(decoder.next_message().as_deref(), Some(b"first".as_ref()));
        assert_eq!(decoder.next_message().as_deref(), Some(b"second".as_ref()));
        assert_eq!(decoder.next_message().as_deref(), Some(b"third".as_ref()));
    }

    #[test]
    fn duplicate_frame_yields_two_messages() {
        let frame = sample_frame();
        let mut doubled = frame.clone();
        doubled.extend_from_slice(&frame);

        let mut decoder = StreamDecoder::new();
        decoder.append(&doubled);

        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
        assert_eq!(decoder.next_message(), None);
    }

    #[test]
    fn minimum_size_frame_decodes_alone() {
        // payload_len = 2 gives an exact 8-byte frame; it must decode without
        // waiting for a ninth byte.
        let mut wire = BytesMut::new();
        encode_frame(0x05, &[0xAA], &mut wire).unwrap();
        assert_eq!(wire.len(), MIN_WIRE_SIZE);

        let mut decoder = StreamDecoder::new();
        decoder.append(&wire);
        assert_eq!(decoder.next_message().as_deref(), Some([0xAA].as_ref()));
    }

    #[test]
    fn checksum_mismatch_drops_frame_silently() {
        let mut frame = sample_frame();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;

        let mut decoder = StreamDecoder::new();
        decoder.append(&frame);

        assert!(!decoder.has_messages());
        assert_eq!(decoder.buffered(), 0); // full extent consumed
        assert_eq!(decoder.stats().checksum_failures, 1);
    }

    #[test]
    fn any_checksum_bit_flip_drops_only_that_frame() {
        let frame = sample_frame();
        let crc_start = frame.len() - 4;

        for bit in 0..32 {
            let mut corrupted = frame.clone();
            corrupted[crc_start + bit / 8] ^= 1 << (bit % 8);

            let mut decoder = StreamDecoder::new();
            decoder.append(&corrupted);
            decoder.append(&frame);

            assert_eq!(decoder.pending(), 1, "bit {bit}");
            assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
        }
    }

    #[test]
    fn stream_continues_after_bad_frame() {
        let good = sample_frame();
        let mut bad = good.clone();
        bad[3] ^= 0xFF; // corrupt a body byte, CRC now fails

        let mut wire = bad;
        wire.extend_from_slice(&good);
        wire.extend_from_slice(&good);

        let mut decoder = StreamDecoder::new();
        decoder.append(&wire);

        assert_eq!(decoder.pending(), 2);
        assert_eq!(decoder.stats().checksum_failures, 1);
        assert_eq!(decoder.stats().frames_decoded, 2);
    }

    #[test]
    fn resync_skips_garbage_prefix() {
        // 0x0000 and 0x0001 length fields are implausible; the decoder scans
        // past them two bytes at a time until the real frame aligns.
        let mut wire = vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x00];
        wire.extend_from_slice(&sample_frame());

        let mut decoder = StreamDecoder::new();
        decoder.append(&wire);

        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
        assert_eq!(decoder.stats().resync_skips, 3);
    }

    #[test]
    fn complete_extent_with_bad_crc_produces_nothing() {
        // length=3, payload 01 02 03, checksum 00 00 00 01: extent is
        // complete but the CRC is wrong, so nothing is produced.
        let mut decoder = StreamDecoder::new();
        decoder.append(&[0x00, 0x03, 0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x01]);
        assert!(!decoder.has_messages());
    }

    #[test]
    fn incomplete_frame_waits_without_consuming() {
        let frame = sample_frame();
        let mut decoder = StreamDecoder::new();
        decoder.append(&frame[..frame.len() - 1]);

        assert!(!decoder.has_messages());
        assert_eq!(decoder.buffered(), frame.len() - 1);
    }

    #[test]
    fn drained_queue_stays_empty() {
        let mut decoder = StreamDecoder::new();
        decoder.append(&sample_frame());
        assert!(decoder.next_message().is_some());

        for _ in 0..3 {
            assert_eq!(decoder.next_message(), None);
            assert!(!decoder.has_messages());
        }
    }

    #[test]
    fn independent_decoders_do_not_interfere() {
        let mut a = StreamDecoder::new();
        let mut b = StreamDecoder::new();

        a.append(&sample_frame());
        assert!(a.has_messages());
        assert!(!b.has_messages());

        let frame = sample_frame();
        b.append(&frame[..3]);
        assert_eq!(a.buffered(), 0);
        assert_eq!(b.buffered(), 3);
    }

    #[test]
    fn overflow_resets_accumulator_but_keeps_queue() {
        let mut decoder = StreamDecoder::with_config(DecoderConfig {
            max_buffer_size: 16,
        });
        decoder.append(&sample_frame());
        assert_eq!(decoder.pending(), 1);

        // A headerless flood: 0xFFFF length field claims 65 535 bytes, so
        // nothing completes and the remainder trips the bound.
        decoder.append(&[0xFF; 32]);
        assert_eq!(decoder.buffered(), 0);
        assert_eq!(decoder.stats().overflow_resets, 1);
        assert_eq!(decoder.next_message().as_deref(), Some(BODY.as_ref()));
    }

    #[test]
    fn burst_of_valid_frames_larger_than_bound_still_decodes() {
        let mut wire = BytesMut::new();
        for i in 0..8u8 {
            encode_frame(i, &[i; 8], &mut wire).unwrap();
        }
        let mut decoder = StreamDecoder::with_config(DecoderConfig {
            max_buffer_size: 32, // smaller than the burst
        });
        decoder.append(&wire);

        assert_eq!(decoder.pending(), 8);
        assert_eq!(decoder.stats().overflow_resets, 0);
    }

    #[test]
    fn real_capture_banner_frame() {
        // Device banner captured off the wire, CRC included.
        let wire = hex(
            "003D004D533320312E362E302072656C6561736520202020202032303234\
             303330312031343A3032474D5420286329204A534D2F4B43202A2A2A2A2A\
             2A2A004250E029",
        );

        let mut decoder = StreamDecoder::new();
        decoder.append(&wire);

        let message = decoder.next_message().expect("banner should decode");
        assert_eq!(message.as_ref(), &wire[3..wire.len() - 4]);
        assert!(message.starts_with(b"MS3 1.6.0 release"));
    }

    #[test]
    fn real_capture_telemetry_frame() {
        // 513-byte telemetry snapshot captured off the wire.
        let wire = hex(
            "0201010012000000000000000000009393010103E8000002BB0707FFAA00\
             7600670000000003E803E803E500640000006403E8006403E803E800A700\
             0000000000003C0000000000646700006400230000000000000000000000\
             00000000000000000000000000000000000A240000000000000000000000\
             000000000000000000000000000000000003020000000000000000000000\
             000000000000000000000000000000000000000000000000000000000000\
             0004830000000000000000000000000000000000000000000000000000FF\
             AA000000000000000000000000000000000064001E000000000000000000\
             000000000000000000000000000000670000000000000000000000000000\
             000023000000000000000000000000000000000000000000000000000000\
             00000003E803E803E803E803E803E803E803E803E803E803E803E8BF0300\
             000000000000000000000000000000000000000023002C00000000000000\
             00000000000000000000000000000000000000000000000A250000000000\
             000000000000000000000000000000000080000000000000FF47FE001055\
             000000000002BB01BB0000000003E70E0D00000000000000000000000000\
             000000000000000000000000000000000000000000000000000000000000\
             000478000000000000000000000000000000000000000000000000000000\
             0000000000A6A6A60C",
        );

        let mut decoder = StreamDecoder::new();
        decoder.append(&wire);

        let message = decoder.next_message().expect("telemetry should decode");
        assert_eq!(message.as_ref(), &wire[3..wire.len() - 4]);
    }
}
