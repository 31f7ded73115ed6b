//! In-process session backed by a channel pair.
//!
//! `LocalSession` stands in for a network transport: the server side
//! hands packets to [`deliver`](LocalSession::deliver) as if they were
//! read off a socket, and everything the room writes comes out of the
//! receiver returned by [`open`](LocalSession::open). Tests, demos, and
//! in-process bots all ride on it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use gamehall_protocol::Packet;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{Session, SessionError, SessionHandler};

/// A channel-backed [`Session`].
pub struct LocalSession {
    id: AtomicI64,
    closed: AtomicBool,
    /// One mutex guards both dispatch and handler swap, so a swap never
    /// races an in-flight delivery.
    handler: Mutex<Option<Arc<dyn SessionHandler>>>,
    outbound: mpsc::UnboundedSender<Packet>,
}

impl LocalSession {
    /// Opens a session and returns it with the client-side receiver:
    /// every packet the server writes shows up there.
    pub fn open() -> (Arc<Self>, mpsc::UnboundedReceiver<Packet>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(Self {
            id: AtomicI64::new(0),
            closed: AtomicBool::new(false),
            handler: Mutex::new(None),
            outbound: tx,
        });
        (session, rx)
    }

    /// Feeds an inbound packet to the installed handler, as the
    /// transport read loop would. Dropped when no handler is installed
    /// or the session is closed.
    pub fn deliver(&self, packet: Packet) {
        if self.is_closed() {
            return;
        }
        let handler = self.handler.lock();
        if let Some(h) = handler.as_ref() {
            h.on_message(self, packet);
        } else {
            tracing::debug!(session_id = self.id(), "inbound packet with no handler, dropped");
        }
    }

    /// Terminates the session as a transport failure would: the handler
    /// observes `on_close` with the given reason.
    pub fn disconnect(&self, err: SessionError) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let handler = self.handler.lock().take();
        if let Some(h) = handler {
            h.on_close(self, Some(err));
        }
    }
}

impl Session for LocalSession {
    fn id(&self) -> i64 {
        self.id.load(Ordering::SeqCst)
    }

    fn set_id(&self, id: i64) {
        self.id.store(id, Ordering::SeqCst);
    }

    fn write_packet(&self, packet: Packet) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.outbound
            .send(packet)
            .map_err(|_| SessionError::SendFailed("receiver dropped".into()))
    }

    fn async_write_packet(&self, packet: Packet) -> Result<(), SessionError> {
        // The unbounded channel never waits, so the async flavor shares
        // the synchronous path.
        self.write_packet(packet)
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Take the handler out before invoking it: its on_close may call
        // update_handler on this same session.
        let handler = self.handler.lock().take();
        if let Some(h) = handler {
            h.on_close(self, None);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn update_handler(&self, handler: Option<Arc<dyn SessionHandler>>) {
        *self.handler.lock() = handler;
    }
}
