// AI copy routes: tagline and description generation
//
// Requests pass through fixed prompt templates to whatever CopyWriter the
// server was wired with. Provider failures come back as 502 with a generic
// message; the provider's own error text stays in the logs.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use eventola_core::copy::{
    description_prompt, tagline_prompt, DESCRIPTION_SYSTEM, TAGLINE_SYSTEM,
};
use eventola_core::{CopyConfig, CopyWriter};

/// App state for copy routes
#[derive(Clone)]
pub struct CopyState {
    pub writer: Arc<dyn CopyWriter>,
    pub config: CopyConfig,
}

impl CopyState {
    pub fn new(writer: Arc<dyn CopyWriter>, config: CopyConfig) -> Self {
        Self { writer, config }
    }
}

/// Request for a tagline
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TaglineRequest {
    #[schema(example = "Quantum Futures Expo")]
    pub event_title: String,
    #[schema(example = "Two days of demos and talks.")]
    pub event_description: String,
}

/// Request for an event description
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DescriptionRequest {
    #[schema(example = "Quantum Futures Expo")]
    pub event_title: String,
}

/// Generated copy
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CopyResponse {
    pub text: String,
}

/// Create copy routes
pub fn routes(state: CopyState) -> Router {
    Router::new()
        .route("/v1/copy/tagline", post(generate_tagline))
        .route("/v1/copy/description", post(generate_description))
        .with_state(state)
}

/// POST /v1/copy/tagline - Generate a tagline for an event
#[utoipa::path(
    post,
    path = "/v1/copy/tagline",
    request_body = TaglineRequest,
    responses(
        (status = 200, description = "Generated tagline", body = CopyResponse),
        (status = 502, description = "Copy provider unavailable"),
        (status = 500, description = "Internal server error")
    ),
    tag = "copy"
)]
pub async fn generate_tagline(
    State(state): State<CopyState>,
    Json(req): Json<TaglineRequest>,
) -> Result<Json<CopyResponse>, (StatusCode, String)> {
    let prompt = tagline_prompt(&req.event_title, &req.event_description);
    let text = state
        .writer
        .complete(TAGLINE_SYSTEM, &prompt, &state.config)
        .await
        .map_err(provider_error)?;
    Ok(Json(CopyResponse { text }))
}

/// POST /v1/copy/description - Generate a description for an event
#[utoipa::path(
    post,
    path = "/v1/copy/description",
    request_body = DescriptionRequest,
    responses(
        (status = 200, description = "Generated description", body = CopyResponse),
        (status = 502, description = "Copy provider unavailable"),
        (status = 500, description = "Internal server error")
    ),
    tag = "copy"
)]
pub async fn generate_description(
    State(state): State<CopyState>,
    Json(req): Json<DescriptionRequest>,
) -> Result<Json<CopyResponse>, (StatusCode, String)> {
    let prompt = description_prompt(&req.event_title);
    let text = state
        .writer
        .complete(DESCRIPTION_SYSTEM, &prompt, &state.config)
        .await
        .map_err(provider_error)?;
    Ok(Json(CopyResponse { text }))
}

/// Placeholder writer used when no provider key is configured. Every call
/// fails, which the handlers surface as 502.
pub struct UnconfiguredWriter;

#[async_trait::async_trait]
impl CopyWriter for UnconfiguredWriter {
    async fn complete(
        &self,
        _system: &str,
        _prompt: &str,
        _config: &CopyConfig,
    ) -> eventola_core::Result<String> {
        Err(eventola_core::EventolaError::config(
            "no copy provider configured",
        ))
    }
}

fn provider_error(e: eventola_core::EventolaError) -> (StatusCode, String) {
    tracing::error!("Copy provider call failed: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        "Copy generation is temporarily unavailable".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct CannedWriter(&'static str);

    #[async_trait]
    impl CopyWriter for CannedWriter {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _config: &CopyConfig,
        ) -> eventola_core::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingWriter;

    #[async_trait]
    impl CopyWriter for FailingWriter {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _config: &CopyConfig,
        ) -> eventola_core::Result<String> {
            Err(eventola_core::EventolaError::copy("connection refused"))
        }
    }

    fn tagline_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/copy/tagline")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"event_title": "Expo", "event_description": "Demos."}"#,
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_tagline_returns_provider_text() {
        let state = CopyState::new(Arc::new(CannedWriter("Tomorrow, today.")), CopyConfig::default());
        let response = routes(state).oneshot(tagline_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["text"], "Tomorrow, today.");
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_bad_gateway() {
        let state = CopyState::new(Arc::new(FailingWriter), CopyConfig::default());
        let response = routes(state).oneshot(tagline_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        // Provider detail must not leak to the client
        assert!(!text.contains("connection refused"));
    }
}
