use std::net::SocketAddr;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use iv_core::Result;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/keywords", post(handlers::keywords))
        .route("/api/sources", get(handlers::list_sources))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌍 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use iv_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use iv_core::config::ModelConfig;
    use iv_core::{Item, SourceMetadata};
    use iv_pipeline::Pipeline;
    use iv_scrapers::{Scraper, ScraperManager};

    struct Board;

    #[async_trait]
    impl Scraper for Board {
        fn source_metadata(&self) -> SourceMetadata {
            SourceMetadata {
                name: "Board",
                cli_name: "board",
                emoji: "📋",
                base_url: "https://board.example",
            }
        }

        async fn search(&self, _keywords: &[String]) -> iv_core::Result<Vec<Item>> {
            Ok(vec![Item {
                source: "Board".to_string(),
                title: "Rust 后端一面面经".to_string(),
                content: "tokio 调度器".to_string(),
                url: "https://board.example/1".to_string(),
                author: Some("ferris".to_string()),
                score: Some(7),
            }])
        }
    }

    fn app() -> Router {
        let manager = ScraperManager::with_scrapers(vec![Arc::new(Board)], Duration::from_secs(5));
        let model = iv_inference::create_model(&ModelConfig::default());
        create_app(AppState::new(Pipeline::new(model, manager)))
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_analyze() {
        let body = serde_json::json!({
            "position": "Rust Developer",
            "company": "Acme",
            "requirements": "rust, redis",
            "platform": "board"
        });
        let (status, json) = call(post_json("/api/analyze", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "analyzed");
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["per_source"]["Board"], 1);
        assert_eq!(json["items"][0]["author"], "ferris");
        assert_eq!(json["report"]["status"], "failed");
        assert_eq!(json["keywords"][0], "rust");
    }

    #[tokio::test]
    async fn test_blank_job_is_bad_request() {
        let body = serde_json::json!({ "position": " ", "requirements": "" });
        let (status, json) = call(post_json("/api/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "no_keywords");
    }

    #[tokio::test]
    async fn test_keywords() {
        let body = serde_json::json!({ "position": "Rust Developer", "requirements": "docker" });
        let (status, json) = call(post_json("/api/keywords", body)).await;
        assert_eq!(status, StatusCode::OK);
        let keywords: Vec<&str> = json["keywords"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keywords, vec!["rust", "developer", "docker", "Rust Developer", "面试", "面经"]);
    }

    #[tokio::test]
    async fn test_sources_and_health() {
        let (status, json) = call(Request::get("/api/sources").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["cli_name"], "board");

        let (status, json) = call(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError(iv_core::Error::Timeout("x".into())).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError(iv_core::Error::NoKeywords).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(iv_core::Error::Parse("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
