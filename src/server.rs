//! HTTP server exposing the chat pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Answer a question with citations and flow label |
//! | `GET`  | `/health` | Process status and per-dependency reachability |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "internal", "message": "internal server error" } }
//! ```
//!
//! Error codes: `bad_request` (400, also for malformed bodies), `timeout`
//! (504), `internal` (500).
//! Failure detail is logged, never returned.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser clients and
//! the load-testing tool can call the API directly.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::PipelineError;
use crate::models::ChatResponse;
use crate::pipeline::Pipeline;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

/// Starts the server on `[server].bind` with the production backends.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pipeline = Arc::new(Pipeline::from_config(config).await?);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    serve(listener, pipeline).await
}

/// Serves on an already-bound listener. Runs until the process is
/// terminated or the listener fails.
pub async fn serve(listener: tokio::net::TcpListener, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { pipeline })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn timeout_error() -> AppError {
    AppError {
        status: StatusCode::GATEWAY_TIMEOUT,
        code: "timeout".to_string(),
        message: "the request could not be completed in time".to_string(),
    }
}

fn internal_error() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: "internal server error".to_string(),
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmptyQuestion => bad_request(err.to_string()),
            PipelineError::DeadlineExceeded(_) => {
                tracing::error!(error = %err, "chat request timed out");
                timeout_error()
            }
            PipelineError::Generation(_) => {
                tracing::error!(error = %err, "chat request failed");
                internal_error()
            }
        }
    }
}

// ============ POST /chat ============

#[derive(Debug, Deserialize)]
struct ChatRequest {
    question: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = request.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected chat body");
        bad_request("request body must be JSON of the form {\"question\": \"...\"}")
    })?;
    let response = state.pipeline.answer(&request.question).await?;
    Ok(Json(response))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    dependencies: DependencyStatus,
}

/// Only the structured store gets a live probe; the two HTTP services are
/// reported as initialized once their clients were built.
#[derive(Serialize)]
struct DependencyStatus {
    structured_store: String,
    document_search: String,
    generation: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = if state.pipeline.store_reachable().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyStatus {
            structured_store: store.to_string(),
            document_search: "initialized".to_string(),
            generation: "initialized".to_string(),
        },
    })
}
