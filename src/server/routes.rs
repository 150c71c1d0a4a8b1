//! Route handlers for the relay server.
//!
//! This module contains all the HTTP route handlers and related types for the Axum server.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::{Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ServerConfig;
use crate::server::document::{DocumentRegistry, DocumentState};
use crate::server::websocket::handle_websocket_connection;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub documents: usize,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentRegistry>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            documents: Arc::new(DocumentRegistry::new(config.channel_capacity)),
            started_at: Utc::now(),
        }
    }
}

/// Basic health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running!".to_string(),
        started_at: state.started_at,
        documents: state.documents.len(),
    })
}

/// Current text and bookkeeping of an existing document
pub async fn document_state(
    Path(doc_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DocumentState>, StatusCode> {
    let handle = state.documents.get(&doc_id).ok_or(StatusCode::NOT_FOUND)?;
    let document = handle
        .inspect()
        .await
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(document))
}

/// WebSocket connection handler for collaborative editing
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(doc_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    info!(%doc_id, "WebSocket upgrade requested");
    let document = state.documents.get_or_spawn(&doc_id);
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, document))
}

/// Creates and configures the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/docs/:doc_id", get(document_state))
        .route("/ws/:doc_id", get(ws_handler))
        .with_state(state)
}
