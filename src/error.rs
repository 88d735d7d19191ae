use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::net::frame::FrameError;
use crate::pinger::protocols::ParseResponseError;

/// Everything that can end a status query. Protocol violations, transport
/// failures and timeouts stay distinct so the caller can classify them.
#[derive(Error, Debug)]
pub enum PingError {
    #[error("invalid hostname {0:?}")]
    InvalidHostname(String),
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Parse(#[from] ParseResponseError),
    #[error("connection closed after {buffered} bytes, before a full packet arrived")]
    ConnectionClosed { buffered: usize },
    #[error("ping timed out after {0:?}")]
    Timeout(Duration),
}

impl PingError {
    /// Whether the server should be reported as unreachable rather than as
    /// having sent something we could not understand.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            PingError::Io(_) | PingError::ConnectionClosed { .. } | PingError::Timeout(_)
        )
    }
}

/// Failure inside SRV resolution. Never escapes the resolver.
#[derive(Error, Debug)]
pub enum DnsLookupError {
    #[error("invalid DoH endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("DoH request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("DoH query timed out after {0:?}")]
    Timeout(Duration),
    #[error("DoH server returned HTTP {0}")]
    HttpStatus(u16),
    #[error("malformed DoH response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("DNS query failed with response code {0}")]
    Rcode(i32),
    #[error("no usable SRV records")]
    NoAnswer,
}
