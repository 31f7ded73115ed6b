//! Error types for the session layer.

/// Errors raised by a session, and the reasons a session dies.
///
/// `Clone` because the same reason travels to both the transport caller
/// and the room's leave notification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The session is already closed; no further writes are possible.
    #[error("session closed")]
    Closed,

    /// A write could not be handed to the transport.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The peer vanished — reset, timeout, or a torn stream.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}
