use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// A byte-stream connection to a server.
#[async_trait]
pub trait Transport: Send {
    async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads into `buf`, returning `Ok(0)` once the peer has closed the stream.
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Releases the connection. Calling it more than once is a no-op.
    async fn close(&mut self);
}

#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Transport>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Transport = TcpTransport;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpTransport> {
        debug!("connecting to {host}:{port}");
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(TcpTransport {
            stream: Some(stream),
            peer: format!("{host}:{port}"),
        })
    }
}

pub struct TcpTransport {
    stream: Option<TcpStream>,
    peer: String,
}

impl TcpTransport {
    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport already closed"))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        trace!("writing {} bytes to {}", bytes.len(), self.peer);
        self.stream()?.write_all(bytes).await
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stream()?.read(buf).await?;
        trace!("read {n} bytes from {}", self.peer);
        Ok(n)
    }

    async fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        // the peer may already be gone, dropping the stream releases the fd regardless
        if let Err(e) = stream.shutdown().await {
            trace!("shutdown of {} failed: {e}", self.peer);
        }
        debug!("closed connection to {}", self.peer);
    }
}
