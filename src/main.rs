//! hearth-auth server
//!
//! Bakes the configured security roles, selects the user store, and serves
//! the enforcement surface over HTTP.

use clap::Parser;
use hearth_auth::{
    config::{load_config, LogFormat},
    server::{run, ServerState, TrustedNetworks},
    AccessEngine, StoreRegistry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Authorization core for the hearth home-automation control plane
#[derive(Parser, Debug)]
#[command(name = "hearth-auth")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "HEARTH_AUTH_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides configuration
    #[arg(long, env = "HEARTH_AUTH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Bind host (overrides configuration)
    #[arg(long, env = "HEARTH_AUTH_HOST")]
    host: Option<String>,

    /// Bind port (overrides configuration)
    #[arg(long, env = "HEARTH_AUTH_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())
        .inspect_err(|e| eprintln!("Failed to load configuration: {e}"))?;

    // Precedence: RUST_LOG, then --log-level, then the configuration file.
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }

    info!(version = env!("CARGO_PKG_VERSION"), "starting hearth-auth");

    // Provider factories would be registered here as they are added;
    // an empty registry means only the built-in store is available.
    let registry = StoreRegistry::new();

    let engine = Arc::new(AccessEngine::new(&config.security, &registry));
    info!(roles = engine.role_count(), "access engine ready");

    let trusted = Arc::new(
        TrustedNetworks::parse(&config.security.trusted_networks)
            .inspect_err(|e| error!(error = %e, "invalid trusted_networks entry"))?,
    );

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let bind: SocketAddr = format!("{host}:{port}").parse()?;

    run(ServerState { engine, trusted }, bind).await
}
