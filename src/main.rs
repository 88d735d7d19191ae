use std::fmt;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use craftping::config::{self, Config};
use craftping::processing::{QueryOutcome, StatusQuery, StatusService};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(help = "Hostname of the server to query")]
    hostname: String,

    #[arg(long, short, help = "Port to connect to (skips the SRV lookup)")]
    port: Option<u16>,

    #[arg(long, allow_negative_numbers = true, help = "Protocol version sent in the handshake")]
    protocol_version: Option<i32>,

    #[arg(long, short, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[arg(long, default_value = config::DEFAULT_DOH_ENDPOINT, help = "DNS-over-HTTPS endpoint (JSON API)")]
    doh_endpoint: String,

    #[arg(long, default_value_t = config::DEFAULT_SRV_TIMEOUT.as_millis() as u64)]
    srv_timeout_ms: u64,

    #[arg(long, default_value_t = config::DEFAULT_PING_TIMEOUT.as_millis() as u64)]
    ping_timeout_ms: u64,

    #[arg(long, default_value_t = false, help = "Don't look up SRV records")]
    no_srv: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            doh_endpoint: self.doh_endpoint.clone(),
            srv_timeout: Duration::from_millis(self.srv_timeout_ms),
            ping_timeout: Duration::from_millis(self.ping_timeout_ms),
            srv_enabled: !self.no_srv,
            ..Config::default()
        }
    }

    fn query(&self) -> StatusQuery {
        StatusQuery {
            hostname: self.hostname.clone(),
            port: self.port,
            protocol_version: self.protocol_version,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

fn print_summary(outcome: &QueryOutcome) {
    let target = &outcome.target;
    let status = &outcome.status;
    println!(
        "{} -> {}:{}{} ({} ms)",
        target.server_address,
        target.hostname,
        target.port,
        if target.via_srv { " [SRV]" } else { "" },
        outcome.latency_ms
    );
    println!("version: {} (protocol {})", status.version.name, status.version.protocol);
    if let Some(players) = &status.players {
        println!("players: {}/{}", players.online, players.max);
    }
    if let Some(description) = &status.description {
        println!("motd: {}", description.plain_text());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let service = StatusService::from_config(&args.config())?;

    match service.lookup(&args.query()).await {
        Ok(outcome) => {
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                OutputFormat::Summary => print_summary(&outcome),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_unreachable() => {
            eprintln!("{} is unreachable: {e}", args.hostname);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("failed to query {}", args.hostname))),
    }
}
