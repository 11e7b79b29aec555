use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use iv_core::JobDescription;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub job: JobDescription,
    /// Source CLI name, display name or "all".
    #[serde(default, alias = "platform")]
    pub source: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("📨 Analyze request for {:?}", request.job.position);
    let result = state
        .pipeline
        .process(&request.job, request.source.as_deref())
        .await?;
    Ok(Json(result))
}

pub async fn keywords(
    State(state): State<AppState>,
    Json(job): Json<JobDescription>,
) -> Result<impl IntoResponse, ApiError> {
    let keywords = state.pipeline.extract_keywords(&job).await?;
    Ok(Json(json!({ "keywords": keywords })))
}

pub async fn list_sources(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pipeline.list_sources())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
