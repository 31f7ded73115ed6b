//! A player: an identity bound to a session.

use std::sync::Arc;

use gamehall_protocol::Packet;
use gamehall_session::Session;
use parking_lot::Mutex;

/// An identified participant bound to a transport session.
///
/// The player is a thin shell: it can write to its session and close it,
/// nothing more. It holds no reference to its room — when the session
/// dies, the room learns about it through the session's handler, not
/// through the player.
pub struct Player {
    id: i64,
    session: Mutex<Option<Arc<dyn Session>>>,
}

impl Player {
    /// Creates a player bound to `session`. Ids must be non-zero; zero
    /// is the "unbound" sentinel on the session side.
    pub fn new(id: i64, session: Arc<dyn Session>) -> Arc<Self> {
        Arc::new(Self {
            id,
            session: Mutex::new(Some(session)),
        })
    }

    /// The player's id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The attached session, if the player still has one.
    pub fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.lock().clone()
    }

    /// Whether a session is attached and not closed.
    pub fn connected(&self) -> bool {
        self.session().is_some_and(|s| !s.is_closed())
    }

    /// Writes a packet synchronously. A failed write tears the session
    /// down; the room finds out through the session's close handler.
    pub fn send_packet(&self, packet: Packet) {
        let Some(session) = self.session() else {
            return;
        };
        if let Err(err) = session.write_packet(packet) {
            tracing::debug!(player_id = self.id, error = %err, "write failed, closing session");
            self.close();
        }
    }

    /// Queues a packet without waiting. A synchronous enqueue failure
    /// tears the session down like a failed write.
    pub fn async_send_packet(&self, packet: Packet) {
        let Some(session) = self.session() else {
            return;
        };
        if let Err(err) = session.async_write_packet(packet) {
            tracing::debug!(player_id = self.id, error = %err, "async write failed, closing session");
            self.close();
        }
    }

    /// Closes the attached session and drops it. Idempotent.
    pub fn close(&self) {
        let session = self.session.lock().take();
        if let Some(session) = session {
            session.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use gamehall_session::LocalSession;

    use super::*;

    #[test]
    fn test_connected_reflects_session_state() {
        let (session, _rx) = LocalSession::open();
        let player = Player::new(1, session.clone());
        assert!(player.connected());

        session.close();
        assert!(!player.connected());
    }

    #[test]
    fn test_send_packet_reaches_session() {
        let (session, mut rx) = LocalSession::open();
        let player = Player::new(1, session);

        player.send_packet(Packet::new(4, "ping"));

        assert_eq!(rx.try_recv().unwrap().command, 4);
    }

    #[test]
    fn test_failed_send_closes_and_drops_session() {
        let (session, rx) = LocalSession::open();
        let player = Player::new(1, session.clone());

        // Drop the client side so the next write fails.
        drop(rx);
        player.send_packet(Packet::new(0, "lost"));

        assert!(session.is_closed());
        assert!(player.session().is_none());
        assert!(!player.connected());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (session, _rx) = LocalSession::open();
        let player = Player::new(1, session.clone());

        player.close();
        player.close();

        assert!(session.is_closed());
        assert!(player.session().is_none());
    }
}
