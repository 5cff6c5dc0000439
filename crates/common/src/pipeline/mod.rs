//! Retrieval-augmented chat pipeline
//!
//! Ingestion: validate → checksum → classify → extract → chunk → embed →
//! replace an identical earlier upload → upsert into the session store.
//!
//! Answering: embed the question and query the session store and the shared
//! library, pick a prompt template, build messages, complete, record history
//! and write the transcript. Retrieval and transcript failures are logged and
//! the request carries on without them.

use crate::chunker::{chunk_text, ChunkingConfig};
use crate::classify::{classify_filename, document_kind};
use crate::config::AppConfig;
use crate::embeddings::{create_embedder, Embedder};
use crate::errors::{AppError, Result};
use crate::extract::extract_text;
use crate::llm::{create_chat_model, ChatModel, CompletionOptions};
use crate::metrics;
use crate::models::{chunk_id, ChatMessage, ChunkSource, HitOrigin, RetrievalHit, UploadedFile};
use crate::prompts::{build_messages, session_jurisdiction, PromptLimits, PromptRegistry, PromptTemplate};
use crate::session::ChatSession;
use crate::transcript::{create_transcript_sink, TranscriptEntry, TranscriptSink};
use crate::vector_store::{merge_hits, InMemoryVectorStore, VectorRecord, VectorStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Result of a chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    /// Key of the prompt template used
    pub template: String,
    pub hits: Vec<RetrievalHit>,
    pub model: String,
    pub latency_ms: u64,
}

/// A document turned into embeddable records, not yet stored anywhere
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub file: UploadedFile,
    pub records: Vec<VectorRecord>,
}

/// Hex SHA-256 of a payload
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Classify, extract, chunk and embed one document
pub async fn prepare_document(
    embedder: &dyn Embedder,
    chunking: &ChunkingConfig,
    name: &str,
    mime_type: &str,
    bytes: &[u8],
) -> Result<PreparedDocument> {
    let kind = document_kind(name, mime_type).ok_or_else(|| AppError::UnsupportedFileType {
        name: name.to_string(),
        mime_type: mime_type.to_string(),
    })?;

    let tags = classify_filename(name);
    let text = extract_text(name, kind, bytes)?;
    let chunks = chunk_text(&text, chunking);
    if chunks.is_empty() {
        return Err(AppError::Extraction {
            name: name.to_string(),
            message: "Document produced no chunks".to_string(),
        });
    }

    let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = embedder.embed_batch(&contents).await?;
    if vectors.len() != chunks.len() {
        return Err(AppError::EmbeddingError {
            message: format!("Expected {} embeddings, got {}", chunks.len(), vectors.len()),
        });
    }

    let file_id = Uuid::new_v4();
    let records = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| VectorRecord {
            id: chunk_id(file_id, chunk.index),
            text: chunk.content,
            source: ChunkSource {
                file_id,
                file_name: name.to_string(),
                chunk_index: chunk.index,
                tags: tags.clone(),
            },
            vector,
        })
        .collect::<Vec<_>>();

    let file = UploadedFile {
        id: file_id,
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        kind,
        size_bytes: bytes.len(),
        checksum: checksum(bytes),
        tags,
        chunk_count: records.len(),
        uploaded_at: Utc::now(),
    };

    Ok(PreparedDocument { file, records })
}

/// The chat pipeline shared by every session
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    chat_model: Arc<dyn ChatModel>,
    library: Option<Arc<InMemoryVectorStore>>,
    prompts: PromptRegistry,
    transcript: Arc<dyn TranscriptSink>,
    chunking: ChunkingConfig,
    limits: PromptLimits,
    completion: CompletionOptions,
    top_k: usize,
    max_file_bytes: usize,
}

impl RagPipeline {
    /// Pipeline with default retrieval settings and no library or transcript
    pub fn new(embedder: Arc<dyn Embedder>, chat_model: Arc<dyn ChatModel>) -> Self {
        Self::with_components(&AppConfig::default(), embedder, chat_model)
    }

    /// Build every component from configuration, loading the library snapshot if one is set
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder = create_embedder(&config.embedding)?;
        let chat_model = create_chat_model(&config.llm)?;

        let library = match &config.retrieval.library_snapshot {
            Some(path) => Some(Arc::new(InMemoryVectorStore::load_snapshot(
                path,
                embedder.model_name(),
                embedder.dimension(),
                HitOrigin::Library,
            )?)),
            None => None,
        };

        info!(
            embedder = embedder.model_name(),
            chat_model = chat_model.model_name(),
            library_chunks = library.as_ref().map(|l| l.len()).unwrap_or(0),
            "RAG pipeline initialized"
        );

        Ok(Self {
            library,
            ..Self::with_components(config, embedder, chat_model)
        })
    }

    fn with_components(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            chat_model,
            library: None,
            prompts: PromptRegistry::with_overrides(config.prompts.templates.clone()),
            transcript: create_transcript_sink(&config.transcript),
            chunking: config.chunking(),
            limits: PromptLimits {
                max_context_chars: config.retrieval.max_context_chars,
                history_turns: config.retrieval.history_turns,
            },
            completion: CompletionOptions::from(&config.llm),
            top_k: config.retrieval.top_k,
            max_file_bytes: config.upload.max_file_bytes,
        }
    }

    pub fn with_library(mut self, library: InMemoryVectorStore) -> Self {
        self.library = Some(Arc::new(library));
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptSink>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn templates(&self) -> &[PromptTemplate] {
        self.prompts.templates()
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn chat_model_name(&self) -> &str {
        self.chat_model.model_name()
    }

    /// Number of chunks in the shared library
    pub fn library_len(&self) -> usize {
        self.library.as_ref().map(|l| l.len()).unwrap_or(0)
    }

    /// Ingest an uploaded file into the session
    #[instrument(skip(self, session, bytes), fields(session_id = %session.id, size = bytes.len()))]
    pub async fn ingest_file(
        &self,
        session: &mut ChatSession,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<UploadedFile> {
        let start = Instant::now();

        if bytes.len() > self.max_file_bytes {
            return Err(AppError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.max_file_bytes,
            });
        }
        if bytes.is_empty() {
            return Err(AppError::Validation {
                message: format!("{} is empty", name),
                field: Some("file".to_string()),
            });
        }

        let prepared = prepare_document(self.embedder.as_ref(), &self.chunking, name, mime_type, bytes).await?;

        let replaced: Vec<Uuid> = session
            .files
            .iter()
            .filter(|f| f.checksum == prepared.file.checksum)
            .map(|f| f.id)
            .collect();
        for file_id in &replaced {
            let removed = session.store.delete_source(*file_id);
            debug!(%file_id, removed, "Replacing earlier upload with identical content");
        }
        session.files.retain(|f| !replaced.contains(&f.id));

        session.store.upsert(prepared.records)?;
        session.files.push(prepared.file.clone());
        session.touch();

        let file = prepared.file;
        metrics::record_ingestion(start.elapsed().as_secs_f64(), file.chunk_count, file.kind.as_str());
        info!(
            file_id = %file.id,
            file = %file.name,
            chunks = file.chunk_count,
            equipment = ?file.tags.equipment,
            jurisdiction = ?file.tags.jurisdiction,
            "File ingested"
        );

        Ok(file)
    }

    /// Answer a question in the context of the session
    #[instrument(skip(self, session, question), fields(session_id = %session.id))]
    pub async fn answer(
        &self,
        session: &mut ChatSession,
        question: &str,
        template_key: Option<&str>,
    ) -> Result<ChatAnswer> {
        let start = Instant::now();
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation {
                message: "Message must not be empty".to_string(),
                field: Some("message".to_string()),
            });
        }

        let tags = session.file_tags();
        let template = self.prompts.select(template_key, &tags)?.clone();

        let hits = match self.retrieve(&session.store, question).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Retrieval failed, answering without document context");
                Vec::new()
            }
        };

        let messages = build_messages(
            &template,
            session_jurisdiction(&tags),
            &hits,
            &session.messages,
            question,
            self.limits,
        );

        let completion_start = Instant::now();
        let completion = self.chat_model.complete(&messages, self.completion).await;
        metrics::record_completion(
            completion_start.elapsed().as_secs_f64(),
            self.chat_model.model_name(),
            &template.key,
            completion.is_ok(),
        );
        let completion = completion?;

        session.messages.push(ChatMessage::user(question));
        session.messages.push(ChatMessage::assistant(completion.content.clone()));
        session.touch();

        let entry = TranscriptEntry {
            session_id: session.id,
            timestamp: Utc::now(),
            question: question.to_string(),
            answer: completion.content.clone(),
            template: template.key.clone(),
            sources: hits
                .iter()
                .map(|h| format!("{} (chunk {})", h.source.file_name, h.source.chunk_index))
                .collect(),
            file_names: session.file_names(),
        };
        if let Err(e) = self.transcript.record(&entry).await {
            warn!(error = %e, "Failed to write transcript entry");
            metrics::record_transcript_failure();
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        info!(
            template = %template.key,
            hits = hits.len(),
            model = %completion.model,
            latency_ms,
            "Question answered"
        );

        Ok(ChatAnswer {
            answer: completion.content,
            template: template.key,
            hits,
            model: completion.model,
            latency_ms,
        })
    }

    /// Top-k hits across the session store and the library
    async fn retrieve(&self, session_store: &InMemoryVectorStore, question: &str) -> Result<Vec<RetrievalHit>> {
        let library = self.library.as_deref().filter(|l| !l.is_empty());
        if self.top_k == 0 || (session_store.is_empty() && library.is_none()) {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let query = self.embedder.embed(question).await?;

        let mut lists = vec![session_store.query(&query, self.top_k)];
        if let Some(library) = library {
            lists.push(library.query(&query, self.top_k));
        }
        let hits = merge_hits(lists, self.top_k);

        metrics::record_retrieval(start.elapsed().as_secs_f64(), hits.len());
        debug!(hits = hits.len(), "Retrieval complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{EquipmentKind, Jurisdiction};
    use crate::embeddings::HashingEmbedder;
    use crate::llm::{Completion, EchoChatModel};
    use crate::models::Role;
    use async_trait::async_trait;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex as StdMutex;

    const AHU_MANUAL: &str = "Air handling unit AHU-3 maintenance. Replace the supply fan belts every \
        twelve months. Change the MERV 13 filters quarterly or when the pressure drop exceeds one inch. \
        Inspect the chilled water coil for fouling each spring and clean the condensate pan.";

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AppError::EmbeddingError {
                message: "upstream down".to_string(),
            })
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(AppError::EmbeddingError {
                message: "upstream down".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, _messages: &[ChatMessage], _options: CompletionOptions) -> Result<Completion> {
            Err(AppError::CompletionError {
                message: "rate limited".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct RecordingTranscript {
        entries: StdMutex<Vec<TranscriptEntry>>,
    }

    #[async_trait]
    impl TranscriptSink for RecordingTranscript {
        async fn record(&self, entry: &TranscriptEntry) -> Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct BrokenTranscript;

    #[async_trait]
    impl TranscriptSink for BrokenTranscript {
        async fn record(&self, _entry: &TranscriptEntry) -> Result<()> {
            Err(AppError::Internal {
                message: "sheet quota exceeded".to_string(),
            })
        }
    }

    fn pipeline() -> RagPipeline {
        RagPipeline::new(Arc::new(HashingEmbedder::new(128)), Arc::new(EchoChatModel::new())).with_chunking(
            ChunkingConfig {
                chunk_size: 120,
                chunk_overlap: 20,
                min_chunk_chars: 10,
                ..ChunkingConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_ingest_text_file() {
        let pipeline = pipeline();
        let mut session = ChatSession::new();

        let file = pipeline
            .ingest_file(&mut session, "NYC_AHU-3_manual.txt", "text/plain", AHU_MANUAL.as_bytes())
            .await
            .unwrap();

        assert!(file.chunk_count > 1);
        assert_eq!(file.tags.equipment, vec![EquipmentKind::Hvac]);
        assert_eq!(file.tags.jurisdiction, Some(Jurisdiction::NewYorkCity));
        assert_eq!(file.checksum, checksum(AHU_MANUAL.as_bytes()));
        assert_eq!(session.store.len(), file.chunk_count);
        assert_eq!(session.files.len(), 1);
    }

    #[tokio::test]
    async fn test_reupload_replaces_chunks() {
        let pipeline = pipeline();
        let mut session = ChatSession::new();

        let first = pipeline
            .ingest_file(&mut session, "ahu.txt", "text/plain", AHU_MANUAL.as_bytes())
            .await
            .unwrap();
        let second = pipeline
            .ingest_file(&mut session, "ahu-copy.txt", "text/plain", AHU_MANUAL.as_bytes())
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(session.files.len(), 1);
        assert_eq!(session.files[0].name, "ahu-copy.txt");
        assert_eq!(session.store.len(), second.chunk_count);
    }

    #[tokio::test]
    async fn test_ingest_rejections() {
        let pipeline = pipeline().with_max_file_bytes(16);
        let mut session = ChatSession::new();

        let err = pipeline
            .ingest_file(&mut session, "big.txt", "text/plain", &[b'a'; 17])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { size: 17, limit: 16 }));

        let err = pipeline
            .ingest_file(&mut session, "drawing.dwg", "application/acad", b"binary")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { .. }));

        let err = pipeline
            .ingest_file(&mut session, "empty.txt", "text/plain", b"")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(session.files.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_session_unchanged() {
        let pipeline = RagPipeline::new(Arc::new(FailingEmbedder), Arc::new(EchoChatModel::new()));
        let mut session = ChatSession::new();

        let err = pipeline
            .ingest_file(&mut session, "ahu.txt", "text/plain", AHU_MANUAL.as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmbeddingError { .. }));
        assert!(session.files.is_empty());
        assert!(session.store.is_empty());
    }

    #[tokio::test]
    async fn test_answer_uses_session_documents() {
        let transcript = Arc::new(RecordingTranscript::default());
        let pipeline = pipeline().with_transcript(transcript.clone());
        let mut session = ChatSession::new();
        pipeline
            .ingest_file(&mut session, "AHU-3_manual.txt", "text/plain", AHU_MANUAL.as_bytes())
            .await
            .unwrap();

        let answer = pipeline
            .answer(&mut session, "How often are the MERV 13 filters changed?", None)
            .await
            .unwrap();

        assert_eq!(answer.template, "hvac");
        assert_eq!(answer.model, "echo");
        assert!(!answer.hits.is_empty());
        assert!(answer.hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(answer.answer.contains("AHU-3_manual.txt"));

        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, Role::User);
        assert_eq!(session.messages[1].role, Role::Assistant);

        let entries = transcript.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_names, vec!["AHU-3_manual.txt".to_string()]);
        assert_eq!(entries[0].sources.len(), answer.hits.len());
    }

    #[tokio::test]
    async fn test_answer_merges_library_hits() {
        let embedder = HashingEmbedder::new(128);
        let chunking = ChunkingConfig::default();
        let doc = prepare_document(
            &embedder,
            &chunking,
            "sprinkler_inspection.txt",
            "text/plain",
            b"Sprinkler main drain test is performed quarterly per NFPA 25.",
        )
        .await
        .unwrap();
        let mut library = InMemoryVectorStore::new(HitOrigin::Library);
        library.upsert(doc.records).unwrap();

        let pipeline = pipeline().with_library(library);
        let mut session = ChatSession::new();

        let answer = pipeline
            .answer(&mut session, "How often is the sprinkler main drain test?", Some("fire_protection"))
            .await
            .unwrap();
        assert_eq!(answer.template, "fire_protection");
        assert_eq!(answer.hits.len(), 1);
        assert_eq!(answer.hits[0].origin, HitOrigin::Library);
        assert_eq!(pipeline.library_len(), 1);
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_not_fatal() {
        let mut session = ChatSession::new();
        let seeded = pipeline();
        seeded
            .ingest_file(&mut session, "ahu.txt", "text/plain", AHU_MANUAL.as_bytes())
            .await
            .unwrap();

        let pipeline = RagPipeline::new(Arc::new(FailingEmbedder), Arc::new(EchoChatModel::new()));
        let answer = pipeline.answer(&mut session, "Filter interval?", None).await.unwrap();
        assert!(answer.hits.is_empty());
        assert!(answer.answer.contains("No document excerpts matched"));
    }

    #[tokio::test]
    async fn test_transcript_failure_is_not_fatal() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = ::metrics::set_default_local_recorder(&recorder);

        let pipeline = pipeline().with_transcript(Arc::new(BrokenTranscript));
        let mut session = ChatSession::new();
        let answer = pipeline.answer(&mut session, "Hello", None).await;
        assert!(answer.is_ok());
        assert_eq!(session.messages.len(), 2);
        assert!(handle
            .render()
            .contains("facilitychat_transcript_errors_total 1"));
    }

    #[tokio::test]
    async fn test_completion_failure_keeps_history_clean() {
        let pipeline = RagPipeline::new(Arc::new(HashingEmbedder::new(32)), Arc::new(FailingModel));
        let mut session = ChatSession::new();

        let err = pipeline.answer(&mut session, "Hello", None).await.unwrap_err();
        assert!(matches!(err, AppError::CompletionError { .. }));
        assert!(session.messages.is_empty());
    }

    #[tokio::test]
    async fn test_answer_validation() {
        let pipeline = pipeline();
        let mut session = ChatSession::new();

        let err = pipeline.answer(&mut session, "   ", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = pipeline.answer(&mut session, "Hi", Some("unknown")).await.unwrap_err();
        assert!(matches!(err, AppError::TemplateNotFound { .. }));
    }

    /// Index `AHU_MANUAL` with a 16-dimensional hashing embedder and save it as a snapshot
    async fn write_library(dir: &Path, model: &str) -> PathBuf {
        let prepared = prepare_document(
            &HashingEmbedder::new(16),
            &ChunkingConfig::default(),
            "AHU-3_manual.txt",
            "text/plain",
            AHU_MANUAL.as_bytes(),
        )
        .await
        .unwrap();
        let mut library = InMemoryVectorStore::new(HitOrigin::Library);
        library.upsert(prepared.records).unwrap();

        let path = dir.join("library.json");
        library.save_snapshot(&path, model).unwrap();
        path
    }

    #[tokio::test]
    async fn test_from_config_wires_library_prompts_and_transcript() {
        let dir = std::env::temp_dir().join(format!("facilitychat-pipeline-{}", Uuid::new_v4()));
        let snapshot = write_library(&dir, "hashing").await;
        let transcript_path = dir.join("transcript.jsonl");

        let mut config = AppConfig::default();
        config.embedding.dimension = Some(16);
        config.retrieval.library_snapshot = Some(snapshot);
        config.prompts.templates = vec![PromptTemplate {
            key: "lab_exhaust".to_string(),
            title: "Lab exhaust".to_string(),
            system_prompt: "You maintain laboratory exhaust fans.".to_string(),
            equipment: None,
        }];
        config.transcript.enabled = true;
        config.transcript.path = transcript_path.clone();

        let pipeline = RagPipeline::from_config(&config).unwrap();
        assert!(pipeline.library_len() > 0);
        assert!(pipeline.templates().iter().any(|t| t.key == "lab_exhaust"));
        assert!(pipeline.templates().iter().any(|t| t.key == "general"));

        let mut session = ChatSession::new();
        let answer = pipeline
            .answer(&mut session, "How often are the AHU-3 filters changed?", Some("lab_exhaust"))
            .await
            .unwrap();
        assert_eq!(answer.template, "lab_exhaust");
        assert!(!answer.hits.is_empty());
        assert!(answer.hits.iter().all(|h| h.origin == HitOrigin::Library));

        let written = tokio::fs::read_to_string(&transcript_path).await.unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains("lab_exhaust"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_from_config_rejects_mismatched_library() {
        let dir = std::env::temp_dir().join(format!("facilitychat-pipeline-{}", Uuid::new_v4()));
        let snapshot = write_library(&dir, "text-embedding-3-small").await;

        let mut config = AppConfig::default();
        config.embedding.dimension = Some(16);
        config.retrieval.library_snapshot = Some(snapshot.clone());
        let err = RagPipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));

        let snapshot = write_library(&dir, "hashing").await;
        config.embedding.dimension = Some(32);
        config.retrieval.library_snapshot = Some(snapshot);
        let err = RagPipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_checksum() {
        assert_eq!(
            checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
