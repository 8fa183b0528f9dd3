/// Errors that can occur when encoding frames or reading from a stream.
///
/// Decoding has no error path: the [`StreamDecoder`](crate::StreamDecoder)
/// absorbs malformed wire input internally and always makes forward progress.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame body is empty. A decodable frame carries at least one body
    /// byte after the flag (`payload_len >= 2`).
    #[error("frame body is empty (a decodable frame needs at least one body byte)")]
    EmptyBody,

    /// The flag+body payload exceeds what the 2-byte length field can declare.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading from the underlying stream.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
