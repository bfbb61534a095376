//! RAG Server binary
//!
//! Run with: cargo run -p physics-rag --bin physics-rag-server -- --config physics-rag.toml

use clap::Parser;
use physics_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "physics-rag-server")]
#[command(about = "Physics knowledge-base question answering over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults to ./physics-rag.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve without ingesting the knowledge directory first
    #[arg(long)]
    skip_ingest: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "physics_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load(cli.config.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Ollama: {}", config.llm.base_url);
    tracing::info!("  - Embedding model: {} ({} dimensions)", config.llm.embed_model, config.embeddings.dimensions);
    tracing::info!("  - Generation model: {}", config.llm.generate_model);
    tracing::info!("  - Vector store: {:?} {} / {}", config.vector_db.backend, config.vector_db.url, config.vector_db.collection);
    tracing::info!("  - Knowledge dir: {}", config.ingestion.knowledge_dir.display());
    tracing::info!("  - Chunking: {} bytes, {} overlap", config.chunking.chunk_size, config.chunking.chunk_overlap);

    let server = RagServer::new(config)?;

    match server.bootstrap(!cli.skip_ingest).await {
        Ok(Some(report)) => tracing::info!(
            "Knowledge base ready: {}/{} files, {} points",
            report.files_ingested,
            report.files_seen,
            report.points_written
        ),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Startup failed ({}): {}", e.kind(), e);
            return Err(e.into());
        }
    }

    tracing::info!("Endpoints: POST /chat, POST /v1/chat, GET /health, GET /ready");
    server.start().await?;

    Ok(())
}
