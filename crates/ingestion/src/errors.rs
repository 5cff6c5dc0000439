//! Ingestion tool error types

use facilitychat_common::errors::AppError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No documents could be indexed from {}", .0.display())]
    NothingIndexed(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] AppError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
