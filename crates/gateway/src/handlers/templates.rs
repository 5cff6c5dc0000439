//! Prompt template listing

use axum::{extract::State, Json};
use facilitychat_common::prompts::PromptTemplate;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct TemplatesResponse {
    pub templates: Vec<PromptTemplate>,
}

/// List the available prompt templates in display order
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        templates: state.pipeline.templates().to_vec(),
    })
}
