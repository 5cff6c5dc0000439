//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub embedder: String,
    pub chat_model: String,
    pub library_chunks: usize,
    pub active_sessions: usize,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: facilitychat_common::VERSION,
    })
}

/// Readiness probe - reports the configured models and loaded data
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready".to_string(),
        embedder: state.pipeline.embedder_name().to_string(),
        chat_model: state.pipeline.chat_model_name().to_string(),
        library_chunks: state.pipeline.library_len(),
        active_sessions: state.sessions.len().await,
    })
}
