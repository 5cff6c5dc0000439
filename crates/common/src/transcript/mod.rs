//! Conversation transcript logging
//!
//! Every answered question is written to a [`TranscriptSink`]. Stores cap the
//! size of a single field, so text is truncated before it is written. A failed
//! write must never fail the chat request: callers log it and move on.

use crate::config::TranscriptConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Suffix appended to truncated fields
pub const TRUNCATION_MARKER: &str = "…[truncated]";

/// One question/answer exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    pub template: String,
    /// `file (chunk i)` labels of the excerpts used
    pub sources: Vec<String>,
    /// Files uploaded to the session
    pub file_names: Vec<String>,
}

impl TranscriptEntry {
    /// Copy of the entry with every text field cut to `max_chars`
    pub fn truncated(&self, max_chars: usize) -> Self {
        Self {
            session_id: self.session_id,
            timestamp: self.timestamp,
            question: truncate_for_storage(&self.question, max_chars),
            answer: truncate_for_storage(&self.answer, max_chars),
            template: truncate_for_storage(&self.template, max_chars),
            sources: self
                .sources
                .iter()
                .map(|s| truncate_for_storage(s, max_chars))
                .collect(),
            file_names: self
                .file_names
                .iter()
                .map(|s| truncate_for_storage(s, max_chars))
                .collect(),
        }
    }
}

/// Cut `text` to at most `max_chars` characters, marker included
pub fn truncate_for_storage(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_len {
        return text.chars().take(max_chars).collect();
    }

    let mut out: String = text.chars().take(max_chars - marker_len).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Destination for transcript entries
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    async fn record(&self, entry: &TranscriptEntry) -> Result<()>;
}

/// Appends one JSON object per line to a local file
pub struct JsonlTranscript {
    path: PathBuf,
    max_field_chars: usize,
    lock: Mutex<()>,
}

impl JsonlTranscript {
    pub fn new(path: PathBuf, max_field_chars: usize) -> Self {
        Self {
            path,
            max_field_chars,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TranscriptSink for JsonlTranscript {
    async fn record(&self, entry: &TranscriptEntry) -> Result<()> {
        let mut line = serde_json::to_string(&entry.truncated(self.max_field_chars))?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AppError::Internal {
                message: format!("Failed to open transcript {}: {}", self.path.display(), e),
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(session_id = %entry.session_id, path = %self.path.display(), "Transcript entry written");
        Ok(())
    }
}

/// Discards entries
#[derive(Debug, Default)]
pub struct NoopTranscript;

#[async_trait]
impl TranscriptSink for NoopTranscript {
    async fn record(&self, _entry: &TranscriptEntry) -> Result<()> {
        Ok(())
    }
}

/// Create a transcript sink based on configuration
pub fn create_transcript_sink(config: &TranscriptConfig) -> Arc<dyn TranscriptSink> {
    if config.enabled {
        Arc::new(JsonlTranscript::new(config.path.clone(), config.max_field_chars))
    } else {
        Arc::new(NoopTranscript)
    }
}
