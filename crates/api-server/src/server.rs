//! API server — serves the alert feed over HTTP.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use pulse_analyzer::AlertPipeline;
use pulse_core::config::AppConfig;
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Analysis endpoints
        .route("/v1/alerts", get(rest::list_alerts))
        .route("/v1/alerts/summary", get(rest::alert_summary))
        .route("/v1/classifications", get(rest::list_classifications))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    config: AppConfig,
    pipeline: AlertPipeline,
}

impl ApiServer {
    pub fn new(config: AppConfig, pipeline: AlertPipeline) -> Self {
        Self { config, pipeline }
    }

    /// Start the HTTP REST server. Blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            pipeline: self.pipeline.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router(state)).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
