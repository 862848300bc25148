//! Paddock HTTP service binary.
//!
//! # Configuration
//!
//! - `PADDOCK_DATA_DIR` - session data directory (default: platform data dir)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `REPLAY_INTERVAL_POLICY` - `carry-last-known` (default) or `immediate-predecessor`
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus endpoint
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use std::net::SocketAddr;

use tracing::{error, info};

use paddock_service::app;
use paddock_service_shared::{
    AppState, LoggingConfig, MetricsConfig, ServiceConfig, init_logging, init_metrics,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("paddock");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "metrics unavailable, continuing without them");
    }

    let config = ServiceConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid configuration");
        e
    })?;

    info!(
        data_dir = %config.data_dir.display(),
        port = config.port,
        interval_policy = ?config.interval_policy,
        "starting paddock service"
    );

    let state = AppState::load(&config.data_dir)
        .map_err(|e| {
            error!(error = %e, path = %config.data_dir.display(), "failed to load application state");
            e
        })?
        .with_interval_policy(config.interval_policy);

    let router = app(state, &metrics_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
