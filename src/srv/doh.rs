//! DNS-over-HTTPS using the JSON API (`application/dns-json`).
//!
//! ```text
//! GET /dns-query?name=_minecraft._tcp.example.com&type=SRV
//! Accept: application/dns-json
//! ```

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::DnsLookupError;

const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DohResponse {
    /// DNS response code, 0 is NOERROR.
    #[serde(rename = "Status")]
    pub status: i32,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DohAnswer {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(rename = "TTL", default)]
    pub ttl: u32,
    pub data: String,
}

#[async_trait]
pub trait DohClient: Send + Sync {
    async fn query(&self, name: &str, record_type: &str) -> Result<DohResponse, DnsLookupError>;
}

pub struct HttpsDohClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpsDohClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DnsLookupError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn query_url(&self, name: &str, record_type: &str) -> Result<Url, DnsLookupError> {
        Url::parse_with_params(&self.endpoint, [("name", name), ("type", record_type)]).map_err(
            |e| DnsLookupError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            },
        )
    }
}

#[async_trait]
impl DohClient for HttpsDohClient {
    async fn query(&self, name: &str, record_type: &str) -> Result<DohResponse, DnsLookupError> {
        let url = self.query_url(name, record_type)?;
        debug!(url = %url, "sending DoH query");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, DNS_JSON_CONTENT_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DnsLookupError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
