//! REST handlers exposing the alert feed and operational endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use pulse_analyzer::{AlertPipeline, AlertSummary, AnalysisOptions};
use pulse_classifier::ClassifiedEntity;
use pulse_core::types::Alert;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Maximum accepted length of a campaign id filter.
const MAX_FIELD_LEN: usize = 256;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AlertPipeline,
    pub node_id: String,
    pub start_time: Instant,
}

/// Query parameters shared by the analysis endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub campaign_id: Option<String>,
}

impl AnalysisQuery {
    fn into_options(self) -> Result<AnalysisOptions, (StatusCode, Json<ErrorResponse>)> {
        let campaign_id = self.campaign_id.filter(|id| !id.trim().is_empty());
        if campaign_id.as_ref().is_some_and(|id| id.len() > MAX_FIELD_LEN) {
            metrics::counter!("api.validation_errors").increment(1);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid_query".to_string(),
                    message: "'campaign_id' exceeds maximum length".to_string(),
                }),
            ));
        }
        Ok(AnalysisOptions {
            as_of: None,
            campaign_id,
        })
    }
}

/// GET /v1/alerts — severity-ranked alert feed. Empty when any source
/// collection could not be fetched.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<Vec<Alert>>, (StatusCode, Json<ErrorResponse>)> {
    let options = query.into_options()?;
    Ok(Json(state.pipeline.run(&options).await))
}

/// GET /v1/alerts/summary — alert and category counts for one pass.
pub async fn alert_summary(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AlertSummary>, (StatusCode, Json<ErrorResponse>)> {
    let options = query.into_options()?;
    Ok(Json(state.pipeline.analyze(&options).await.summary()))
}

/// GET /v1/classifications — every classified entity with its derived metrics.
pub async fn list_classifications(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<Vec<ClassifiedEntity>>, (StatusCode, Json<ErrorResponse>)> {
    let options = query.into_options()?;
    Ok(Json(state.pipeline.analyze(&options).await.entities))
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}
