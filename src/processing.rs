use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::config::Config;
use crate::error::{DnsLookupError, PingError};
use crate::net::tcp::{Connector, TcpConnector};
use crate::pinger::protocols::minecraft::Minecraft;
use crate::pinger::status::StatusResponse;
use crate::pinger::Pinger;
use crate::srv::doh::{DohClient, HttpsDohClient};
use crate::srv::{ResolvedTarget, SrvResolver};

/// What a caller asks for. Without a `port`, SRV records decide where to
/// connect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub hostname: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub protocol_version: Option<i32>,
}

impl StatusQuery {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: None,
            protocol_version: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_protocol_version(mut self, protocol_version: i32) -> Self {
        self.protocol_version = Some(protocol_version);
        self
    }
}

/// Where the ping actually went, and the name it presented itself with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    pub hostname: String,
    pub port: u16,
    pub via_srv: bool,
    pub server_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub status: StatusResponse,
    pub target: TargetDescriptor,
    pub latency_ms: u64,
}

pub struct StatusService<C, D> {
    pinger: Pinger<C>,
    resolver: Option<SrvResolver<D>>,
    default_port: u16,
    default_protocol_version: i32,
}

impl StatusService<TcpConnector, HttpsDohClient> {
    /// Builds the HTTP client for SRV lookups once, up front. Fails if TLS
    /// can't be initialised.
    pub fn from_config(config: &Config) -> Result<Self, DnsLookupError> {
        let resolver = if config.srv_enabled {
            Some(SrvResolver::from_config(config)?)
        } else {
            None
        };
        Ok(Self::new(
            Pinger::new(TcpConnector, config.ping_timeout),
            resolver,
            config,
        ))
    }
}

impl<C: Connector, D: DohClient> StatusService<C, D> {
    pub fn new(pinger: Pinger<C>, resolver: Option<SrvResolver<D>>, config: &Config) -> Self {
        Self {
            pinger,
            resolver,
            default_port: config.default_port,
            default_protocol_version: config.default_protocol_version,
        }
    }

    /// Resolves the connection target and pings it. SRV resolution finishes
    /// (or gives up) before the ping starts, and the two have separate
    /// timeouts.
    pub async fn lookup(&self, query: &StatusQuery) -> Result<QueryOutcome, PingError> {
        let server_address = normalize_hostname(&query.hostname)
            .ok_or_else(|| PingError::InvalidHostname(query.hostname.clone()))?;
        let port = query.port.unwrap_or(self.default_port);
        let protocol_version = query
            .protocol_version
            .unwrap_or(self.default_protocol_version);

        let srv_target = match (&self.resolver, query.port) {
            (Some(resolver), None) => resolver.resolve(&server_address).await,
            _ => None,
        };
        let via_srv = srv_target.is_some();
        let target = srv_target.unwrap_or_else(|| ResolvedTarget {
            hostname: server_address.clone(),
            port,
        });
        debug!(
            "pinging {}:{} as {server_address}:{port} (via SRV: {via_srv})",
            target.hostname, target.port
        );

        let protocol = Minecraft::new(server_address.clone(), port, protocol_version);
        let started = Instant::now();
        let status = self
            .pinger
            .ping(&target.hostname, target.port, &protocol)
            .await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        Ok(QueryOutcome {
            status,
            target: TargetDescriptor {
                hostname: target.hostname,
                port: target.port,
                via_srv,
                server_address,
            },
            latency_ms,
        })
    }
}

/// Trims whitespace and a single trailing dot. Returns `None` for an empty
/// name.
pub fn normalize_hostname(hostname: &str) -> Option<String> {
    let hostname = hostname.trim();
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    if hostname.is_empty() {
        None
    } else {
        Some(hostname.to_string())
    }
}
