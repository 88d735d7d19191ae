#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use craftping::error::DnsLookupError;
use craftping::net::frame::{build_packet, Packet};
use craftping::net::tcp::{Connector, Transport};
use craftping::net::varint;
use craftping::srv::doh::{DohClient, DohResponse};

pub const STATUS_JSON: &str = r#"{"version":{"name":"1.20.4","protocol":765},"players":{"max":20,"online":3},"description":{"text":"§6A Test Server"}}"#;

pub fn status_packet(json: &str) -> Packet {
    let mut payload = Vec::new();
    varint::write(&mut payload, json.len() as i32);
    payload.extend_from_slice(json.as_bytes());
    build_packet(0x00, &payload)
}

/// What the server side of a [`MockConnector`] does.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Hands back these chunks one read at a time, then EOF.
    Chunks(Vec<Vec<u8>>),
    /// Never answers a read.
    Stall,
    /// Refuses the connection.
    Refuse,
    /// Never finishes connecting.
    Hang,
}

impl Reply {
    pub fn packet_in_chunks(packet: &Packet, chunk_size: usize) -> Self {
        Reply::Chunks(
            packet
                .as_bytes()
                .chunks(chunk_size)
                .map(<[u8]>::to_vec)
                .collect(),
        )
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub connects: Mutex<Vec<(String, u16)>>,
    pub written: Mutex<Vec<u8>>,
    pub closes: AtomicUsize,
}

impl Recorder {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().clone()
    }

    pub fn connects(&self) -> Vec<(String, u16)> {
        self.connects.lock().clone()
    }
}

pub struct MockConnector {
    pub recorder: Arc<Recorder>,
    reply: Reply,
}

impl MockConnector {
    pub fn new(reply: Reply) -> Self {
        Self {
            recorder: Arc::new(Recorder::default()),
            reply,
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, host: &str, port: u16) -> io::Result<MockTransport> {
        self.recorder.connects.lock().push((host.to_string(), port));
        let chunks = match &self.reply {
            Reply::Refuse => return Err(io::ErrorKind::ConnectionRefused.into()),
            Reply::Hang => std::future::pending().await,
            Reply::Stall => None,
            Reply::Chunks(chunks) => Some(chunks.iter().cloned().collect()),
        };
        Ok(MockTransport {
            recorder: self.recorder.clone(),
            chunks,
        })
    }
}

pub struct MockTransport {
    recorder: Arc<Recorder>,
    chunks: Option<VecDeque<Vec<u8>>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.recorder.written.lock().extend_from_slice(bytes);
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(chunks) = self.chunks.as_mut() else {
            return std::future::pending().await;
        };
        let Some(mut chunk) = chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    async fn close(&mut self) {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Answers every DoH query with the same canned result.
pub struct StaticDohClient {
    response: Result<String, u16>,
    stall: bool,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl StaticDohClient {
    pub fn answering(srv_data: &[&str]) -> Self {
        let answers: Vec<String> = srv_data
            .iter()
            .map(|data| {
                format!(r#"{{"name":"srv","type":33,"TTL":300,"data":"{data}"}}"#)
            })
            .collect();
        Self::json(&format!(r#"{{"Status":0,"Answer":[{}]}}"#, answers.join(",")))
    }

    pub fn json(body: &str) -> Self {
        Self {
            response: Ok(body.to_string()),
            stall: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn http_error(status: u16) -> Self {
        Self {
            response: Err(status),
            stall: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::json("{}")
        }
    }

    pub fn queried_names(&self) -> Vec<String> {
        self.queries.lock().iter().map(|(name, _)| name.clone()).collect()
    }
}

#[async_trait]
impl DohClient for StaticDohClient {
    async fn query(&self, name: &str, record_type: &str) -> Result<DohResponse, DnsLookupError> {
        self.queries
            .lock()
            .push((name.to_string(), record_type.to_string()));
        if self.stall {
            std::future::pending::<()>().await;
        }
        match &self.response {
            Ok(body) => Ok(serde_json::from_str(body)?),
            Err(status) => Err(DnsLookupError::HttpStatus(*status)),
        }
    }
}
