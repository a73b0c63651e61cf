//! Mirror Proxy
//!
//! Serves one upstream website under the proxy's own host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────┐   OPTIONS   ┌───────────────┐
//!     ───────────────────▶│  http    │────────────▶│ CORS preflight│──┐
//!                         │  server  │             └───────────────┘  │
//!                         └────┬─────┘                                │
//!                              │ any other method                     │
//!                              ▼                                      │
//!                         ┌──────────┐   single attempt   ┌────────┐  │
//!                         │ upstream │───────────────────▶│ origin │  │
//!                         │forwarder │◀───────────────────│        │  │
//!                         └────┬─────┘                    └────────┘  │
//!                              │ ok / 502                             │
//!                              ▼                                      │
//!                         ┌──────────┐   text/html   ┌──────────┐     │
//!                         │ response │──────────────▶│ rewrite  │     │
//!                         │transform │◀──────────────│  (html)  │     │
//!                         └────┬─────┘               └──────────┘     │
//!     Client Response          │                                      │
//!     ◀────────────────────────┴──────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mirror_proxy::config::{ensure_valid, read_config, ConfigError, ProxyConfig};
use mirror_proxy::observability::{logging, metrics};
use mirror_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "mirror-proxy")]
#[command(about = "Reverse proxy that mirrors a single upstream website", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `upstream.base_url`.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };
        if let Some(upstream) = &self.upstream {
            config.upstream.base_url = upstream.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        ensure_valid(&config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability);

    tracing::info!("mirror-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.serve(shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
