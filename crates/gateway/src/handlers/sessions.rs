//! Session management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use facilitychat_common::{
    errors::Result,
    models::{ChatMessage, UploadedFile},
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;

/// Create session response
#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub expires_at: Option<String>,
}

/// Session state response
#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: String,
    pub last_active_at: String,
    pub expires_at: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub files: Vec<UploadedFile>,
}

/// Create a new session
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>)> {
    let shared = state.sessions.create().await;
    let session = shared.lock().await;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            expires_at: session
                .expires_at(state.sessions.ttl())
                .map(|at| at.to_rfc3339()),
        }),
    ))
}

/// Get session state
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let shared = state.sessions.get(session_id).await?;
    let session = shared.lock().await;

    Ok(Json(SessionResponse {
        session_id: session.id,
        created_at: session.created_at.to_rfc3339(),
        last_active_at: session.last_active_at.to_rfc3339(),
        expires_at: session
            .expires_at(state.sessions.ttl())
            .map(|at| at.to_rfc3339()),
        messages: session.messages.clone(),
        files: session.files.clone(),
    }))
}

/// Delete a session with its documents
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
