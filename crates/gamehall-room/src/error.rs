//! Error types for the room layer.

use crate::StackError;

/// Errors surfaced by room operations.
///
/// Callers discriminate by variant, never by message text.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room has been closed; the operation can never succeed.
    #[error("room is closed")]
    RoomClosed,

    /// `run` was called while the loop is already running.
    #[error("room is already running")]
    RoomRunning,

    /// The operation needs a running loop and the room is still pending.
    #[error("room is not running")]
    RoomNotRunning,

    /// A player id of 0 is reserved for "unbound".
    #[error("invalid player id")]
    InvalidPlayer,

    /// A player with this id is already in the room.
    #[error("player already in room")]
    PlayerExists,

    /// No player with this id is in the room.
    #[error("player not in room")]
    PlayerNotExist,

    /// The player's session is missing or already closed.
    #[error("player session is unusable")]
    BadSession,

    /// Frame mode needs a positive tick interval.
    #[error("frame mode requires a positive tick interval")]
    BadInterval,

    /// A game callback or ticker panicked; the room was torn down.
    /// The error's string form is the panic value followed by the stack.
    #[error(transparent)]
    Panicked(#[from] StackError),
}
