//! Domain records shared by the pipeline and the API
//!
//! Three flat records: uploaded files, chat messages and retrieval hits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::FileTags;

/// Supported document kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
        }
    }
}

/// An uploaded file after ingestion. The byte payload is not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
    /// Hex SHA-256 of the payload
    pub checksum: String,
    pub tags: FileTags,
    pub chunk_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Chat role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkSource {
    pub file_id: Uuid,
    pub file_name: String,
    pub chunk_index: usize,
    #[serde(default)]
    pub tags: FileTags,
}

/// Which store produced a hit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HitOrigin {
    /// Documents uploaded in the current session
    Session,
    /// The shared pre-indexed reference library
    Library,
}

/// A retrieved chunk with its cosine distance to the query (lower is closer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub chunk_id: String,
    pub text: String,
    pub source: ChunkSource,
    pub distance: f32,
    pub origin: HitOrigin,
}

/// Build the store id for a chunk
pub fn chunk_id(file_id: Uuid, chunk_index: usize) -> String {
    format!("{}:{}", file_id, chunk_index)
}
