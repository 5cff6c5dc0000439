//! Chat handlers

use axum::{
    extract::{Path, State},
    Json,
};
use facilitychat_common::{
    errors::{AppError, Result},
    ChatAnswer,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 8000))]
    pub message: String,

    /// Prompt template key; chosen from the session's documents when absent
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub template: Option<String>,
}

/// Ask a question in the session
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatAnswer>> {
    // Validate request
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let shared = state.sessions.get(session_id).await?;
    let mut session = shared.lock().await;

    let answer = state
        .pipeline
        .answer(&mut session, &request.message, request.template.as_deref())
        .await?;

    Ok(Json(answer))
}
