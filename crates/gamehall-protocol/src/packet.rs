//! Packet and lockstep frame-data types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The opaque unit of game traffic.
///
/// A packet is a `command` discriminator plus an uninterpreted body.
/// The room core routes packets without ever looking inside them; what
/// a command means is a contract between the game and its clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Application-level command discriminator.
    pub command: u16,
    /// Uninterpreted payload. `Bytes` makes cloning for broadcast cheap.
    pub body: Bytes,
}

impl Packet {
    /// Creates a packet from a command and any byte-like body.
    pub fn new(command: u16, body: impl Into<Bytes>) -> Self {
        Self {
            command,
            body: body.into(),
        }
    }

    /// The body interpreted as UTF-8, for logging and text protocols.
    /// Invalid UTF-8 yields `None`.
    pub fn body_as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// One player's input for one lockstep frame.
///
/// Collected by the frame accumulator in the room crate; the payload is
/// as opaque as a packet body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameData {
    /// The submitting player.
    pub player_id: i64,
    /// The player's encoded input for this frame.
    pub payload: Bytes,
}
