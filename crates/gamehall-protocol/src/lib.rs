//! Wire boundary for Gamehall.
//!
//! This crate defines the small surface the room core shares with a
//! transport:
//!
//! - **[`Packet`]** — the opaque unit of game traffic. The room never
//!   inspects a packet's body; it only routes it.
//! - **[`FrameData`]** — one player's input for one lockstep frame.
//! - **Codecs** ([`FrameCodec`], [`JsonCodec`]) — how packets become
//!   bytes on a stream socket or a web socket.
//! - **[`ProtocolError`]** — what can go wrong while framing.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (player identity). It knows nothing about rooms or games.
//!
//! ```text
//! Transport (bytes) → Protocol (Packet) → Session (player context) → Room
//! ```

mod codec;
mod error;
mod packet;

pub use codec::FrameCodec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use packet::{FrameData, Packet};
