//! HTTP server implementation using Axum.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::models::{ChatMessage, DocumentSummary};
use crate::service::{ServiceError, SidekickService};

const MISSING_CHAT_FIELDS: &str = "documentId and newMessage are required.";

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SidekickService>,
}

/// JSON error body: `{ "error": "<message>" }` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message.clone()),
            ServiceError::UnsupportedMediaType(_) => {
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, error.to_string()),
            ServiceError::Extraction(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not read text from that PDF. Try another file.",
            ),
            ServiceError::Storage(inner) => {
                tracing::error!(error = ?inner, "Request failed");
                Self::internal("Internal server error.")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Body of `POST /chat`.
///
/// Unknown fields, including the prior `messages` history sent by the UI,
/// are ignored: each question is answered on its own.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub document_id: Option<String>,
    pub new_message: Option<String>,
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "AI Knowledge Sidekick backend is running",
    }))
}

/// Lists uploaded documents.
async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let service = state.service.clone();
    let documents = run_blocking(move || service.list_documents()).await?;
    Ok(Json(documents))
}

/// Accepts a multipart upload with a single `file` field.
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentSummary>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        upload = Some((name, mime, bytes));
        break;
    }

    let Some((name, mime, bytes)) = upload else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded."));
    };

    let service = state.service.clone();
    let summary = run_blocking(move || service.upload_document(&name, &mime, &bytes)).await?;
    Ok(Json(summary))
}

/// Answers a question about an uploaded document.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatMessage>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected chat body");
        ApiError::new(StatusCode::BAD_REQUEST, MISSING_CHAT_FIELDS)
    })?;

    let document_id = request.document_id.unwrap_or_default();
    let question = request.new_message.unwrap_or_default();

    let service = state.service.clone();
    let reply = run_blocking(move || service.ask(&document_id, &question)).await?;
    Ok(Json(reply))
}

/// Runs service work (SQLite, PDF parsing, the blocking HTTP client) off the
/// async worker threads.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Blocking task failed");
            ApiError::internal("Internal server error.")
        })?
        .map_err(ApiError::from)
}

/// Build the Axum router with all routes.
pub fn build_router(service: Arc<SidekickService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/documents", get(list_documents).post(upload_document))
        .route("/chat", post(chat))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

/// Binds the listener and serves until Ctrl-C.
pub async fn serve(config: &Config, service: Arc<SidekickService>) -> Result<()> {
    let router = build_router(service, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;

    tracing::info!("Backend listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
