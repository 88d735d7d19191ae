//! `_minecraft._tcp` SRV resolution over DNS-over-HTTPS.

use std::time::Duration;

use serde::Serialize;
use tokio::time;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::DnsLookupError;
use crate::srv::doh::{DohAnswer, DohClient, HttpsDohClient};
use crate::srv::record::{SrvRecord, SRV_RECORD_TYPE};
use crate::srv::select::select_target;

pub mod doh;
pub mod record;
pub mod select;

const SERVICE_PREFIX: &str = "_minecraft._tcp.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub hostname: String,
    pub port: u16,
}

pub struct SrvResolver<D> {
    client: D,
    timeout: Duration,
}

impl SrvResolver<HttpsDohClient> {
    pub fn from_config(config: &Config) -> Result<Self, DnsLookupError> {
        let client = HttpsDohClient::new(config.doh_endpoint.clone())?;
        Ok(Self::new(client, config.srv_timeout))
    }
}

impl<D: DohClient> SrvResolver<D> {
    pub fn new(client: D, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn client(&self) -> &D {
        &self.client
    }

    /// Resolves the SRV target for `hostname`. Every failure, including the
    /// timeout, yields `None` so the caller can fall back to a plain port.
    pub async fn resolve(&self, hostname: &str) -> Option<ResolvedTarget> {
        match self.lookup(hostname).await {
            Ok(target) => {
                debug!("{hostname} resolved to {}:{} via SRV", target.hostname, target.port);
                Some(target)
            }
            Err(e) => {
                debug!("no SRV target for {hostname}: {e}");
                None
            }
        }
    }

    /// Like [`resolve`](Self::resolve) but keeps the reason a lookup failed.
    pub async fn lookup(&self, hostname: &str) -> Result<ResolvedTarget, DnsLookupError> {
        let name = service_name(hostname);

        // dropping the query future on timeout aborts the HTTP request
        let response = time::timeout(self.timeout, self.client.query(&name, "SRV"))
            .await
            .map_err(|_| DnsLookupError::Timeout(self.timeout))??;
        if response.status != 0 {
            return Err(DnsLookupError::Rcode(response.status));
        }

        let records = parse_answers(&response.answer);
        let record = select_target(&records, &mut rand::thread_rng()).ok_or(DnsLookupError::NoAnswer)?;

        Ok(ResolvedTarget {
            hostname: record.target.clone(),
            port: record.port,
        })
    }
}

pub fn service_name(hostname: &str) -> String {
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    format!("{SERVICE_PREFIX}{hostname}")
}

/// Keeps the valid SRV answers, dropping other record types (CNAMEs in the
/// chain) and records that fail to parse.
pub fn parse_answers(answers: &[DohAnswer]) -> Vec<SrvRecord> {
    answers
        .iter()
        .filter(|answer| answer.record_type == SRV_RECORD_TYPE)
        .filter_map(|answer| {
            let record = SrvRecord::parse(&answer.data);
            if record.is_none() {
                trace!("discarding invalid SRV answer {:?}", answer.data);
            }
            record
        })
        .collect()
}
