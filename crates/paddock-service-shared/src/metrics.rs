//! Prometheus metrics for the Paddock API.
//!
//! This module provides:
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`init_metrics`]: Install the Prometheus recorder
//! - [`metrics_handler`]: Axum handler for the `/metrics` endpoint
//! - Business metric helpers for replays, track maps and rejected queries
//!
//! Recording helpers are no-ops until [`init_metrics`] has installed a recorder.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled.
    pub enabled: bool,
    /// Path for the metrics endpoint.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create configuration from environment variables.
    ///
    /// - `METRICS_ENABLED`: "true" or "false" (default: true)
    /// - `METRICS_PATH`: Path for metrics endpoint (default: "/metrics")
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("METRICS_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = lookup("METRICS_PATH")
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder.
///
/// # Errors
///
/// Fails if metrics are disabled, the recorder was already installed, or the
/// exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Axum handler for the metrics endpoint (Prometheus exposition format).
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone)]
pub enum MetricsError {
    /// Metrics are disabled in configuration.
    Disabled,
    /// The recorder has already been installed.
    AlreadyInitialized,
    /// The Prometheus builder failed to install.
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => write!(f, "failed to install metrics recorder: {}", e),
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Record a replay served for a session code, with its lap count.
pub fn record_replay_built(session_code: &str, laps: usize) {
    metrics::counter!(
        "paddock_replays_built_total",
        "session" => session_code.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "paddock_replay_laps",
        "session" => session_code.to_string()
    )
    .record(laps as f64);
}

/// Record a served track map. `by_driver` distinguishes driver-specific maps.
pub fn record_track_map(by_driver: bool) {
    metrics::counter!(
        "paddock_track_maps_total",
        "scope" => if by_driver { "driver" } else { "session" }
    )
    .increment(1);
}

/// Record a request rejected by query validation.
pub fn record_query_rejected(path: &str) {
    metrics::counter!(
        "paddock_query_rejected_total",
        "path" => path.to_string()
    )
    .increment(1);
}

/// Record a provider failure by its machine error code.
pub fn record_provider_failure(code: &str) {
    metrics::counter!(
        "paddock_provider_failures_total",
        "code" => code.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_metrics_config_defaults() {
        let config = MetricsConfig::from_lookup(lookup(&[]));
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_metrics_config_disabled() {
        let config = MetricsConfig::from_lookup(lookup(&[("METRICS_ENABLED", "FALSE")]));
        assert!(!config.enabled);
    }

    #[test]
    fn test_metrics_config_rejects_relative_path() {
        let config = MetricsConfig::from_lookup(lookup(&[("METRICS_PATH", "stats")]));
        assert_eq!(config.path, "/metrics");
        let config = MetricsConfig::from_lookup(lookup(&[("METRICS_PATH", "/internal/metrics")]));
        assert_eq!(config.path, "/internal/metrics");
    }

    #[test]
    fn test_init_disabled() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };
        assert!(matches!(init_metrics(&config), Err(MetricsError::Disabled)));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_replay_built("R", 57);
        record_track_map(true);
        record_query_rejected("/api/v1/events/seasons");
        record_provider_failure("session_not_found");
    }
}
