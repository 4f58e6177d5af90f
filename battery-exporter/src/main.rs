// Battery Exporter - HTTP ingest endpoint and Prometheus exporter
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Battery Exporter
//!
//! Receives battery status from the browser extension and exposes it
//! as Prometheus gauges, optionally pushing every update to a Pushgateway.
//!
//! ## Usage
//!
//! ```bash
//! # Listen on the default port, push to localhost:9091
//! battery-exporter
//!
//! # Custom port, scrape-only
//! battery-exporter --port 9090 --pushgateway ""
//! ```

mod server;

use battery_monitor::{
    BatteryMetrics, Ingestor, MetricsError, PushError, PushGateway, Pusher, DEFAULT_PORT,
    VERSION,
};
use clap::Parser;
use prometheus::Registry;
use server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Battery status Prometheus exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the HTTP server to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Pushgateway address (empty disables pushing)
    #[arg(long, default_value = "localhost:9091")]
    pushgateway: String,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 64 * 1024)]
    max_body_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Startup failures; all of them end the process.
#[derive(Error, Debug)]
enum ExporterError {
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] MetricsError),

    #[error("{0}")]
    Push(#[from] PushError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::from_default_env().add_directive(parse_level(&args.log_level).into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Battery Exporter v{}", VERSION);

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Registry holding the battery gauges plus, on Linux, process metrics.
fn build_registry() -> Result<(Registry, BatteryMetrics), MetricsError> {
    let registry = Registry::new();
    let metrics = BatteryMetrics::register(&registry)?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    Ok((registry, metrics))
}

async fn run(args: Args) -> Result<(), ExporterError> {
    let (_, metrics) = build_registry()?;

    let pusher: Option<Arc<dyn Pusher>> = match PushGateway::from_address(&args.pushgateway)? {
        Some(gateway) => {
            info!("Pushing to {} as job {:?}", gateway.url(), gateway.job());
            Some(Arc::new(gateway))
        }
        None => {
            info!("No pushgateway configured, scrape-only mode");
            None
        }
    };

    let state = Arc::new(AppState::new(
        Ingestor::new(Arc::new(metrics), pusher),
        args.max_body_bytes,
    ));
    let app = server::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("listening on port {}", args.port);
    info!("Metrics endpoint: http://{}/metrics", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ExporterError::Bind { addr, source })?;
    axum::serve(listener, app)
        .await
        .map_err(ExporterError::Serve)
}
