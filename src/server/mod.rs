//! Relay server for collaborative editing.
//!
//! This module contains the Axum web server that routes websocket sessions to
//! per-document actors and exposes a small HTTP API.

pub mod document;
pub mod routes;
pub mod websocket;

// Re-export main server functionality
pub use document::{DocumentHandle, DocumentRegistry, DocumentState};
pub use routes::{AppState, create_router};
