//! The [`Session`] and [`SessionHandler`] traits.

use std::sync::Arc;

use gamehall_protocol::Packet;

use crate::SessionError;

/// One player's live connection, seen from the room side.
///
/// Implementations wrap a concrete transport (a TCP stream task, a web
/// socket, or [`LocalSession`](crate::LocalSession)'s in-process pair).
/// All methods are callable from any thread.
pub trait Session: Send + Sync + 'static {
    /// The player id bound to this session, `0` until bound.
    fn id(&self) -> i64;

    /// Binds a player id to the session so the handler can recover it
    /// when packets arrive.
    fn set_id(&self, id: i64);

    /// Writes a packet, waiting for the transport to accept it.
    fn write_packet(&self, packet: Packet) -> Result<(), SessionError>;

    /// Queues a packet for the transport without waiting. A synchronous
    /// enqueue failure is still reported.
    fn async_write_packet(&self, packet: Packet) -> Result<(), SessionError>;

    /// Closes the session. Idempotent. The installed handler's
    /// [`on_close`](SessionHandler::on_close) fires once, with no error.
    fn close(&self);

    /// Whether the session has been closed (locally or by the peer).
    fn is_closed(&self) -> bool;

    /// Swaps the receiver of subsequent inbound events. The swap is
    /// atomic with respect to dispatch: a handler never observes events
    /// after it has been replaced.
    fn update_handler(&self, handler: Option<Arc<dyn SessionHandler>>);
}

/// Receiver of a session's inbound events. The room implements this.
pub trait SessionHandler: Send + Sync + 'static {
    /// A decoded packet arrived from the peer.
    fn on_message(&self, session: &dyn Session, packet: Packet);

    /// The session terminated. `err` is `None` for a deliberate local
    /// close and the transport failure otherwise.
    fn on_close(&self, session: &dyn Session, err: Option<SessionError>);
}
