use std::time::Duration;

pub const DEFAULT_DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";
pub const DEFAULT_SRV_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(4500);
pub const DEFAULT_PORT: u16 = 25565;
/// 1.20.4
pub const DEFAULT_PROTOCOL_VERSION: i32 = 765;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DNS-over-HTTPS endpoint speaking the `application/dns-json` API.
    pub doh_endpoint: String,
    pub srv_timeout: Duration,
    pub ping_timeout: Duration,
    /// Port used when the caller gives none and no SRV record is found.
    pub default_port: u16,
    pub default_protocol_version: i32,
    /// Look up `_minecraft._tcp` records when no port is given.
    pub srv_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doh_endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            srv_timeout: DEFAULT_SRV_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            default_port: DEFAULT_PORT,
            default_protocol_version: DEFAULT_PROTOCOL_VERSION,
            srv_enabled: true,
        }
    }
}
