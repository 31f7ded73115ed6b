//! Codecs: how a [`Packet`] travels as bytes.
//!
//! Two flavors, matching the two transports a Gamehall server typically
//! fronts:
//!
//! - [`FrameCodec`] — length-delimited binary frames for stream sockets
//!   (TCP, QUIC streams). Implements `tokio_util::codec::{Encoder, Decoder}`
//!   so it can be dropped into a `Framed` transport directly.
//! - [`JsonCodec`] — JSON packets for web-socket transports, where the
//!   socket itself provides message boundaries.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Packet, ProtocolError};

/// Wire layout: `u32` big-endian length of (command + body), then the
/// `u16` big-endian command, then the body bytes.
const LEN_PREFIX: usize = 4;
const HEADER: usize = 2;

/// Length-delimited binary codec for stream transports.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl FrameCodec {
    /// Creates a codec that rejects frames larger than `max_frame_len`
    /// (command + body, excluding the length prefix).
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        // 64 KiB covers every packet a well-behaved game client sends.
        Self::new(64 * 1024)
    }
}

impl Decoder for FrameCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, ProtocolError> {
        if src.len() < LEN_PREFIX {
            return Ok(None);
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&src[..LEN_PREFIX]);
        let frame_len = u32::from_be_bytes(len_bytes) as usize;

        if frame_len > self.max_frame_len {
            return Err(ProtocolError::FrameTooLarge(frame_len));
        }
        if frame_len < HEADER {
            return Err(ProtocolError::InvalidFrame(format!(
                "length {frame_len} is shorter than the packet header"
            )));
        }

        if src.len() < LEN_PREFIX + frame_len {
            // Partial frame; ask for more bytes before trying again.
            src.reserve(LEN_PREFIX + frame_len - src.len());
            return Ok(None);
        }

        src.advance(LEN_PREFIX);
        let command = src.get_u16();
        let body: Bytes = src.split_to(frame_len - HEADER).freeze();

        Ok(Some(Packet { command, body }))
    }
}

impl Encoder<Packet> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let frame_len = HEADER + packet.body.len();
        if frame_len > self.max_frame_len {
            return Err(ProtocolError::FrameTooLarge(frame_len));
        }

        dst.reserve(LEN_PREFIX + frame_len);
        dst.put_u32(frame_len as u32);
        dst.put_u16(packet.command);
        dst.extend_from_slice(&packet.body);
        Ok(())
    }
}

/// JSON codec for web-socket transports.
///
/// The socket frames messages for us, so each message is one packet
/// serialized with serde.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl JsonCodec {
    /// Serializes a packet to JSON bytes.
    pub fn encode(&self, packet: &Packet) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(packet).map_err(ProtocolError::Encode)
    }

    /// Deserializes a packet from JSON bytes.
    pub fn decode(&self, data: &[u8]) -> Result<Packet, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
