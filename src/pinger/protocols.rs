use thiserror::Error;

use crate::net::frame::Packet;
use crate::net::varint::VarIntError;

pub mod minecraft;

#[derive(Error, Debug)]
pub enum ParseResponseError {
    #[error("failed to decode varint in response: {0}")]
    Decode(#[from] VarIntError),
    #[error("unexpected packet id {found:#04x} (expected {expected:#04x})")]
    UnexpectedPacketId { expected: i32, found: i32 },
    #[error("payload declares {declared} bytes but only {remaining} remain")]
    TruncatedPayload { declared: i32, remaining: usize },
    #[error("malformed status payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// One request/response exchange with a server.
pub trait Protocol: Send + Sync {
    type Response;

    /// Packets written to the server, in order, before the response is read.
    fn requests(&self) -> Vec<Packet>;

    fn parse_response(&self, packet: &Packet) -> Result<Self::Response, ParseResponseError>;
}
