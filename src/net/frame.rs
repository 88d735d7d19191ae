//! Length-prefixed packet framing.
//!
//! ```text
//! VarInt(length) | VarInt(packet id) | payload
//!                  \_______ length bytes _______/
//! ```
//!
//! Because the length field itself is variable-width, a reader cannot assume
//! a fixed header size and has to decode it incrementally.

use thiserror::Error;
use tracing::trace;

use crate::net::varint::{self, VarIntError};

/// Largest body a packet may declare (the 3-byte VarInt limit).
pub const MAX_PACKET_LENGTH: i32 = 2_097_151;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid packet length prefix: {0}")]
    Length(VarIntError),
    #[error("packet declares length {0}, allowed range is 0..={MAX_PACKET_LENGTH}")]
    InvalidLength(i32),
}

/// One complete frame, length prefix included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8>,
}

impl Packet {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds an outbound frame. Pure, no I/O.
pub fn build_packet(packet_id: i32, payload: &[u8]) -> Packet {
    let body_len = varint::encoded_len(packet_id) + payload.len();

    let mut bytes = Vec::with_capacity(varint::MAX_VARINT_LEN + body_len);
    varint::write(&mut bytes, body_len as i32);
    varint::write(&mut bytes, packet_id);
    bytes.extend_from_slice(payload);

    Packet { bytes }
}

#[derive(Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Not enough bytes yet. `expected_length` is the full frame size once
    /// the length prefix has been decoded.
    Accumulating { expected_length: Option<usize> },
    Complete(Packet),
}

/// Reassembles one frame from an arbitrarily chunked byte stream.
#[derive(Debug, Default)]
pub struct PacketReader {
    buf: Vec<u8>,
}

impl PacketReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk read from the transport and checks whether a whole
    /// frame is now buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Result<FrameState, FrameError> {
        self.buf.extend_from_slice(chunk);
        self.poll()
    }

    pub fn poll(&mut self) -> Result<FrameState, FrameError> {
        let (length, header_len) = match varint::decode(&self.buf, 0) {
            Ok(decoded) => decoded,
            Err(VarIntError::Incomplete) => {
                trace!(buffered = self.buf.len(), "length prefix incomplete");
                return Ok(FrameState::Accumulating {
                    expected_length: None,
                });
            }
            Err(e) => return Err(FrameError::Length(e)),
        };
        if !(0..=MAX_PACKET_LENGTH).contains(&length) {
            return Err(FrameError::InvalidLength(length));
        }

        let frame_len = header_len + length as usize;
        if self.buf.len() < frame_len {
            trace!(buffered = self.buf.len(), frame_len, "waiting for packet body");
            return Ok(FrameState::Accumulating {
                expected_length: Some(frame_len),
            });
        }

        // anything past the frame belongs to the next packet
        let rest = self.buf.split_off(frame_len);
        let bytes = std::mem::replace(&mut self.buf, rest);
        Ok(FrameState::Complete(Packet { bytes }))
    }

    /// Number of bytes buffered but not yet returned as a packet.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}
