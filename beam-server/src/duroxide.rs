use anyhow::{Context, Result};
use beam_orchestrations::ace_client::AceClient;
use beam_orchestrations::registry::{create_activity_registry, create_orchestration_registry};
use duroxide::runtime::{LogFormat, ObservabilityConfig, Runtime, RuntimeOptions};
use duroxide_pg::PostgresProvider;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

const SCHEMA_NAME: &str = "beam_duroxide";

/// Connect to the Duroxide store, creating its tables if needed
pub async fn connect_store(db_url: &str) -> Result<Arc<PostgresProvider>> {
    tracing::info!("Connecting to Duroxide store (schema: {})", SCHEMA_NAME);

    let store = Arc::new(PostgresProvider::new_with_schema(db_url, Some(SCHEMA_NAME)).await
        .map_err(|e| anyhow::anyhow!("Failed to initialize Duroxide store: {}", e))?);

    store.initialize_schema().await
        .map_err(|e| anyhow::anyhow!("Failed to initialize Duroxide schema: {}", e))?;

    Ok(store)
}

/// Initialize the ACE session, the Duroxide store and a runtime with the
/// lifecycle orchestrations registered
pub async fn initialize(config: &Config) -> Result<(Arc<Runtime>, Arc<PostgresProvider>)> {
    let client = AceClient::connect(&config.ace)
        .await
        .context("Failed to open ACE session for activities")?;
    beam_orchestrations::init_remote_actions(Arc::new(client));

    let store = connect_store(config.database_url()?).await?;

    let activities = Arc::new(create_activity_registry());
    let orchestrations = create_orchestration_registry();

    // A single remote action is bounded by the request timeout; leave headroom
    let mut runtime_options = RuntimeOptions::default();
    runtime_options.worker_lock_timeout = config.ace.request_timeout + Duration::from_secs(60);

    match observability_config(|name| std::env::var(name).ok()) {
        Some(observability) => {
            tracing::info!(
                "Duroxide observability enabled: metrics → {}, log level = {}",
                observability.metrics_export_endpoint.as_deref().unwrap_or("off"),
                observability.log_level
            );
            runtime_options.observability = observability;
        }
        None => tracing::info!("Duroxide observability disabled"),
    }

    tracing::info!(
        "Starting Duroxide runtime (activity lock timeout: {}s)",
        runtime_options.worker_lock_timeout.as_secs()
    );
    let runtime = Runtime::start_with_options(
        store.clone(),
        activities,
        orchestrations,
        runtime_options,
    )
    .await;

    tracing::info!("Duroxide runtime ready");

    Ok((runtime, store))
}

/// Runtime logging and metrics settings, or `None` when
/// `DUROXIDE_OBSERVABILITY_ENABLED=false`.
///
/// Metrics are exported only when `OTEL_EXPORTER_OTLP_ENDPOINT` names a
/// collector; a CLI run has none by default.
fn observability_config(lookup: impl Fn(&str) -> Option<String>) -> Option<ObservabilityConfig> {
    let enabled = lookup("DUROXIDE_OBSERVABILITY_ENABLED")
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(true);
    if !enabled {
        return None;
    }

    let endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

    let log_format = match lookup("DUROXIDE_LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
        "compact" => LogFormat::Compact,
        "pretty" => LogFormat::Pretty,
        _ => LogFormat::Json,
    };

    Some(ObservabilityConfig {
        metrics_enabled: endpoint.is_some(),
        metrics_export_endpoint: endpoint,
        metrics_export_interval_ms: 10000,

        log_format,
        log_level: lookup("DUROXIDE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

        service_name: "beam".to_string(),
        service_version: Some(env!("CARGO_PKG_VERSION").to_string()),

        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_observability_defaults_to_logging_only() {
        let config = observability_config(env(&[])).unwrap();
        assert_eq!(config.service_name, "beam");
        assert!(!config.metrics_enabled);
        assert!(config.metrics_export_endpoint.is_none());
        assert_eq!(config.log_level, "info");
        assert!(matches!(config.log_format, LogFormat::Json));
    }

    #[test]
    fn test_observability_metrics_follow_collector_endpoint() {
        let config = observability_config(env(&[
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
            ("DUROXIDE_LOG_FORMAT", "Compact"),
        ]))
        .unwrap();
        assert!(config.metrics_enabled);
        assert_eq!(config.metrics_export_endpoint.as_deref(), Some("http://localhost:4317"));
        assert!(matches!(config.log_format, LogFormat::Compact));
    }

    #[test]
    fn test_observability_can_be_disabled() {
        assert!(observability_config(env(&[("DUROXIDE_OBSERVABILITY_ENABLED", "false")])).is_none());
    }
}
