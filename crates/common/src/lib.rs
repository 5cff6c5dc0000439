//! FacilityChat Common Library
//!
//! Shared code for the FacilityChat services including:
//! - Domain models and filename classifiers
//! - Text extraction and chunking
//! - Embedding and chat model abstractions
//! - Vector storage and the retrieval pipeline
//! - Prompt templates, sessions and transcripts
//! - Error types, configuration and metrics

pub mod chunker;
pub mod classify;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod extract;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod transcript;
pub mod vector_store;

// Re-export commonly used types
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use llm::ChatModel;
pub use pipeline::{ChatAnswer, RagPipeline};
pub use session::{ChatSession, SessionStore};
pub use vector_store::{InMemoryVectorStore, VectorStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
