//! HTTP boundary: validates the identifier, runs the fallback chain, maps the outcome.

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::extractors::{RetrievalOutcome, VideoId};
use crate::transcribe::TranscriptPipeline;
use crate::{ErrorKind, TranscriptError};

/// Title reported when no strategy exposed one
pub const UNKNOWN_TITLE: &str = "Unknown";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TranscriptPipeline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub title: String,
    pub transcript: String,
    pub video_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: ErrorKind,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

impl IntoResponse for TranscriptError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the logs
        let error = match &self {
            TranscriptError::InvalidInput(_) => "Invalid video ID".to_string(),
            TranscriptError::NotFound(_) => self.to_string(),
            TranscriptError::Internal(_) => "Internal server error".to_string(),
        };

        let body = ErrorResponse { error, kind: self.kind() };
        (status, Json(body)).into_response()
    }
}

/// Create the API router
pub fn create_router(pipeline: Arc<TranscriptPipeline>) -> Router {
    Router::new()
        .route("/api/transcript", post(transcript))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}

/// Bind and serve until the process is stopped
pub async fn serve(pipeline: Arc<TranscriptPipeline>, host: &str, port: u16) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(pipeline)).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// `POST /api/transcript`
pub async fn transcript(
    State(state): State<AppState>,
    payload: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Result<Json<TranscriptResponse>, TranscriptError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected transcript request body: {}", rejection);
            return Err(TranscriptError::InvalidInput(rejection.body_text()));
        }
    };

    let raw = request.video_id.unwrap_or_default();
    let video_id = VideoId::parse(&raw)?;

    // A panic inside a strategy must not take the connection down with it
    let pipeline = state.pipeline.clone();
    let task_id = video_id.clone();
    let resolution = tokio::spawn(async move { pipeline.resolve(&task_id).await })
        .await
        .map_err(|e| {
            tracing::error!("Transcript resolution for {} failed: {}", video_id, e);
            TranscriptError::Internal(e.to_string())
        })?;

    match resolution.outcome {
        RetrievalOutcome::Success(found) => Ok(Json(TranscriptResponse {
            title: found.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            transcript: found.transcript,
            video_id: video_id.to_string(),
        })),
        RetrievalOutcome::NotFound { reason } | RetrievalOutcome::TransientFailure { reason } => {
            Err(TranscriptError::NotFound(Some(reason)))
        }
    }
}
