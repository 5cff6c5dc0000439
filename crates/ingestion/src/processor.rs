//! Library indexer
//!
//! Core logic for building the shared reference library: walk a directory,
//! run each PDF/TXT through classify → extract → chunk → embed, and collect
//! the records into a vector store that is written out as a snapshot.

use crate::errors::IngestionError;
use facilitychat_common::chunker::ChunkingConfig;
use facilitychat_common::classify::{document_kind, mime_for};
use facilitychat_common::embeddings::Embedder;
use facilitychat_common::metrics;
use facilitychat_common::models::{HitOrigin, UploadedFile};
use facilitychat_common::pipeline::prepare_document;
use facilitychat_common::vector_store::{InMemoryVectorStore, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Outcome of indexing a directory
pub struct IndexReport {
    pub store: InMemoryVectorStore,
    pub indexed: Vec<UploadedFile>,
    pub failed: Vec<(PathBuf, String)>,
    pub skipped: usize,
}

/// Builds a library store from documents on disk
pub struct LibraryIndexer {
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    max_file_bytes: usize,
}

impl LibraryIndexer {
    pub fn new(embedder: Arc<dyn Embedder>, chunking: ChunkingConfig, max_file_bytes: usize) -> Self {
        Self {
            embedder,
            chunking,
            max_file_bytes,
        }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Index one file into the store
    #[instrument(skip(self, store), fields(path = %path.display()))]
    pub async fn index_file(
        &self,
        path: &Path,
        store: &mut InMemoryVectorStore,
    ) -> Result<UploadedFile, IngestionError> {
        let start = Instant::now();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let bytes = tokio::fs::read(path).await.map_err(|source| IngestionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.len() > self.max_file_bytes {
            return Err(facilitychat_common::AppError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.max_file_bytes,
            }
            .into());
        }

        let mime_type = document_kind(&name, "")
            .map(mime_for)
            .unwrap_or("application/octet-stream");

        let prepared = prepare_document(self.embedder.as_ref(), &self.chunking, &name, mime_type, &bytes).await?;
        store.upsert(prepared.records)?;

        let file = prepared.file;
        metrics::record_ingestion(start.elapsed().as_secs_f64(), file.chunk_count, file.kind.as_str());
        Ok(file)
    }

    /// Index every PDF and text file directly inside `dir`
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn index_directory(&self, dir: &Path) -> Result<IndexReport, IngestionError> {
        if !dir.is_dir() {
            return Err(IngestionError::NotADirectory(dir.to_path_buf()));
        }

        info!("Indexing directory");

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut report = IndexReport {
            store: InMemoryVectorStore::new(HitOrigin::Library),
            indexed: Vec::new(),
            failed: Vec::new(),
            skipped: 0,
        };

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if document_kind(&name, "").is_none() {
                debug!(path = %path.display(), "Skipping unsupported file");
                report.skipped += 1;
                continue;
            }

            match self.index_file(&path, &mut report.store).await {
                Ok(file) => {
                    info!(
                        file = %file.name,
                        chunk_count = file.chunk_count,
                        equipment = ?file.tags.equipment,
                        "Document indexed"
                    );
                    report.indexed.push(file);
                }
                Err(e) => {
                    error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to index document"
                    );
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        info!(
            indexed = report.indexed.len(),
            failed = report.failed.len(),
            skipped = report.skipped,
            chunks = report.store.len(),
            "Directory indexing complete"
        );

        if report.indexed.is_empty() {
            return Err(IngestionError::NothingIndexed(dir.to_path_buf()));
        }

        Ok(report)
    }
}
