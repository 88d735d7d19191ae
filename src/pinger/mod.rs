use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::PingError;
use crate::net::frame::{FrameState, Packet, PacketReader};
use crate::net::tcp::{Connector, Transport};
use crate::pinger::protocols::minecraft::Minecraft;
use crate::pinger::protocols::Protocol;
use crate::pinger::status::StatusResponse;

pub mod protocols;
pub mod status;

const READ_CHUNK_SIZE: usize = 4096;

/// Runs one protocol exchange per call against a fresh connection.
pub struct Pinger<C> {
    connector: C,
    timeout: Duration,
}

impl<C: Connector> Pinger<C> {
    pub fn new(connector: C, timeout: Duration) -> Self {
        Self { connector, timeout }
    }

    /// Connects to `host:port`, writes the protocol's requests and parses the
    /// first packet that comes back.
    ///
    /// Connecting and the exchange share a single deadline. Once it passes,
    /// the pending I/O is dropped and the connection is closed before
    /// [`PingError::Timeout`] is returned. The transport is closed exactly once
    /// on every path that opened it.
    pub async fn ping<P: Protocol>(
        &self,
        host: &str,
        port: u16,
        protocol: &P,
    ) -> Result<P::Response, PingError> {
        let deadline = Instant::now() + self.timeout;

        let mut transport = match time::timeout_at(deadline, self.connector.connect(host, port)).await {
            Ok(connected) => connected?,
            Err(_) => {
                debug!("timed out connecting to {host}:{port}");
                return Err(PingError::Timeout(self.timeout));
            }
        };

        let outcome = time::timeout_at(deadline, exchange(&mut transport, protocol)).await;
        transport.close().await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                debug!("timed out waiting for {host}:{port}");
                Err(PingError::Timeout(self.timeout))
            }
        }
    }

    /// Server list ping. The handshake carries `server_address`/`port` even
    /// when `host`/`transport_port` point somewhere else.
    pub async fn ping_status(
        &self,
        host: &str,
        transport_port: u16,
        server_address: &str,
        port: u16,
        protocol_version: i32,
    ) -> Result<StatusResponse, PingError> {
        let protocol = Minecraft::new(server_address, port, protocol_version);
        self.ping(host, transport_port, &protocol).await
    }
}

async fn exchange<T, P>(transport: &mut T, protocol: &P) -> Result<P::Response, PingError>
where
    T: Transport + ?Sized,
    P: Protocol,
{
    for request in protocol.requests() {
        transport.write_all(request.as_bytes()).await?;
    }
    trace!("requests written, waiting for response");

    let packet = read_packet(transport).await?;
    Ok(protocol.parse_response(&packet)?)
}

/// Reads from `transport` until exactly one frame has been assembled.
pub async fn read_packet<T>(transport: &mut T) -> Result<Packet, PingError>
where
    T: Transport + ?Sized,
{
    let mut reader = PacketReader::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let n = transport.read(&mut chunk).await?;
        if n == 0 {
            return Err(PingError::ConnectionClosed {
                buffered: reader.buffered(),
            });
        }
        match reader.push(&chunk[..n])? {
            FrameState::Complete(packet) => return Ok(packet),
            FrameState::Accumulating { expected_length } => {
                trace!(
                    "have {} bytes of packet (expected: {expected_length:?})",
                    reader.buffered()
                );
            }
        }
    }
}
