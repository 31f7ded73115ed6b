//! Error types for the protocol layer.

/// Errors that can occur while framing or unframing packets.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A frame announced a length beyond the codec's configured limit.
    /// Oversized frames are rejected before any allocation happens.
    #[error("frame of {0} bytes exceeds the frame length limit")]
    FrameTooLarge(usize),

    /// The frame is structurally broken — e.g. a length prefix shorter
    /// than the fixed header.
    #[error("malformed frame: {0}")]
    InvalidFrame(String),

    /// Serialization failed (turning a packet into JSON bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning JSON bytes into a packet).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// An I/O error surfaced by the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
