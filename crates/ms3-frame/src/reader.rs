use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::decoder::{DecoderConfig, DecoderStats, StreamDecoder};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete MS3 messages from any `Read` stream.
///
/// Wraps a [`StreamDecoder`] around a blocking byte source so callers never
/// deal with partial reads or buffer management. Corrupt frames are skipped
/// by the decoder as usual; the only errors are I/O failures and end of
/// stream.
pub struct MessageReader<T> {
    inner: T,
    decoder: StreamDecoder,
}

impl<T: Read> MessageReader<T> {
    /// Create a reader with default decoder configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Create a reader with explicit decoder configuration.
    pub fn with_config(inner: T, config: DecoderConfig) -> Self {
        Self {
            inner,
            decoder: StreamDecoder::with_config(config),
        }
    }

    /// Read the next decoded message (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream ends with
    /// no complete message pending.
    pub fn read_message(&mut self) -> Result<Bytes> {
        loop {
            if let Some(message) = self.decoder.next_message() {
                return Ok(message);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.decoder.append(&chunk[..read]);
        }
    }

    /// Stream counters from the underlying decoder.
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
