//! FacilityChat Ingestion Tool
//!
//! Builds the shared reference library:
//! 1. Walks a directory of PDF/TXT documents
//! 2. Classifies, extracts and chunks each document
//! 3. Embeds the chunks with the configured embedder
//! 4. Writes a vector snapshot the gateway loads at startup

mod errors;
mod processor;

use clap::Parser;
use facilitychat_common::{config::AppConfig, embeddings::create_embedder, VERSION};
use processor::LibraryIndexer;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default snapshot location when neither `--output` nor configuration names one
const DEFAULT_SNAPSHOT: &str = "data/library.json";

#[derive(Parser, Debug)]
#[command(name = "ingestion", version, about = "Index a directory of building documents into a library snapshot")]
struct Args {
    /// Directory containing .pdf and .txt documents (not searched recursively)
    dir: PathBuf,

    /// Snapshot path; defaults to retrieval.library_snapshot
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }

    info!(
        service = %config.observability.service_name,
        "Starting FacilityChat Ingestion Tool v{}",
        VERSION
    );

    let output = args
        .output
        .or_else(|| config.retrieval.library_snapshot.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT));

    let embedder = create_embedder(&config.embedding)?;
    info!(
        dir = %args.dir.display(),
        output = %output.display(),
        embedder = embedder.model_name(),
        dimension = embedder.dimension(),
        "Indexing library"
    );

    let indexer = LibraryIndexer::new(embedder, config.chunking(), config.upload.max_file_bytes);
    let report = indexer.index_directory(&args.dir).await?;

    for (path, reason) in &report.failed {
        warn!(path = %path.display(), reason = %reason, "Document left out of the library");
    }

    report
        .store
        .save_snapshot(&output, indexer.embedder().model_name())?;

    info!(
        documents = report.indexed.len(),
        failed = report.failed.len(),
        output = %output.display(),
        "Library snapshot complete"
    );
    Ok(())
}
