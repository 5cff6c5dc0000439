//! Document upload handlers

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use facilitychat_common::{
    classify::{document_kind, mime_for},
    errors::{AppError, Result},
    models::UploadedFile,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct FilesResponse {
    pub files: Vec<UploadedFile>,
}

struct Upload {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Upload a PDF or text document into the session
pub async fn upload_file(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedFile>)> {
    let shared = state.sessions.get(session_id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation {
                message: "Uploaded file has no filename".to_string(),
                field: Some(FILE_FIELD.to_string()),
            })?;
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        upload = Some(Upload {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(|| AppError::Validation {
        message: format!("Multipart field '{}' is required", FILE_FIELD),
        field: Some(FILE_FIELD.to_string()),
    })?;

    // Browsers send octet-stream for unknown types; record what the extension says instead
    let mime_type = match document_kind(&upload.name, &upload.mime_type) {
        Some(kind) if upload.mime_type.is_empty() || upload.mime_type == "application/octet-stream" => {
            mime_for(kind).to_string()
        }
        _ => upload.mime_type,
    };

    let mut session = shared.lock().await;
    let file = state
        .pipeline
        .ingest_file(&mut session, &upload.name, &mime_type, &upload.bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(file)))
}

/// List files uploaded to the session
pub async fn list_files(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<FilesResponse>> {
    let shared = state.sessions.get(session_id).await?;
    let session = shared.lock().await;

    Ok(Json(FilesResponse {
        files: session.files.clone(),
    }))
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::InvalidFormat {
        message: format!("Invalid multipart body: {}", e.body_text()),
    }
}
