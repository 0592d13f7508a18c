//! CORS proxy entry point.
//!
//! ```text
//!   Browser (page on :8000)                 CORS PROXY                      Inference service
//!   ───────────────────────┐   ┌──────────────────────────────────┐
//!   OPTIONS *              ├──▶│ preflight → 200, empty           │
//!   POST /api/proxy/...    ├──▶│ forward ──────────────────────────┼──▶ POST /api/generate
//!                          │◀──┤ 200 body | 500 {"error": ...}    │◀── JSON reply
//!   GET /index.html        ├──▶│ static files (document root)     │
//!   ───────────────────────┘   │ + CORS headers on every response │
//!                              └──────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use cors_proxy::lifecycle::{startup, Shutdown};
use cors_proxy::observability::{logging, metrics};
use cors_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "cors-proxy")]
#[command(about = "Serve a directory and proxy browser calls to a local inference service", long_about = None)]
struct Cli {
    /// TOML configuration file; every setting has a default.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (all interfaces unless the config says otherwise).
    #[arg(short, long)]
    port: Option<u16>,

    /// Document root for static files.
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Upstream URL the proxy route forwards to.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Upstream request timeout in seconds (default: wait indefinitely).
    #[arg(short, long)]
    timeout: Option<u64>,
}

impl Cli {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            if let Ok(mut addr) = config.listener.bind_address.parse::<SocketAddr>() {
                addr.set_port(port);
                config.listener.bind_address = addr.to_string();
            }
        }
        if let Some(root) = &self.root {
            config.static_files.root = root.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.url = upstream.clone();
        }
        if self.timeout.is_some() {
            config.upstream.timeout_secs = self.timeout;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    tracing::info!("cors-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        timeout_secs = ?config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    startup::print_banner(local_addr, &config.proxy.path);

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
