//! backoffice-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use backoffice_gateway::api;
use backoffice_gateway::app_state::AppState;
use backoffice_gateway::backend::{HttpBackend, InMemoryBackend, RecordBackend};
use backoffice_gateway::config::{GatewayConfig, LogFormat};
use backoffice_gateway::domain::EventBus;
use backoffice_gateway::service::RecordService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting backoffice-gateway");

    let backend = build_backend(&config).await?;
    let event_bus = EventBus::new(config.event_bus_capacity);
    let record_service = Arc::new(RecordService::new(backend, event_bus));
    let app = api::build_app(AppState::new(record_service), config.request_timeout());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn build_backend(config: &GatewayConfig) -> anyhow::Result<Arc<dyn RecordBackend>> {
    if let Some(path) = &config.backend_fixture_path {
        let backend = InMemoryBackend::from_fixture_file(path)
            .await
            .with_context(|| format!("failed to load fixture {}", path.display()))?;
        tracing::info!(path = %path.display(), "serving records from fixture");
        return Ok(Arc::new(backend));
    }

    let backend = HttpBackend::new(
        config.backend_base_url.clone(),
        config.backend_api_token.clone(),
        config.backend_timeout(),
    )
    .context("failed to build backend client")?;
    tracing::info!(base_url = %backend.base_url(), "using platform backend");
    Ok(Arc::new(backend))
}
