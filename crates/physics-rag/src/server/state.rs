//! Application state for the RAG server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{RagConfig, VectorBackend};
use crate::error::Result;
use crate::ingestion::{ExtractorRegistry, IngestPipeline, TextChunker};
use crate::providers::{
    EmbeddingProvider, LlmProvider, MemoryVectorStore, OllamaClient, OllamaEmbedder, OllamaLlm,
    QdrantStore, VectorStoreProvider,
};
use crate::retrieval::QueryEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// Vector store provider
    store: Arc<dyn VectorStoreProvider>,
    /// Generation provider
    llm: Arc<dyn LlmProvider>,
    /// Query orchestrator over the providers above
    query_engine: QueryEngine,
    /// Set once startup ingestion has finished
    ready: RwLock<bool>,
}

impl AppState {
    /// Create the providers described by `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Initializing RAG application state (vector backend: {:?})...",
            config.vector_db.backend
        );

        let ollama = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!(
            "Ollama client initialized at {} (embeddings: {}, generation: {})",
            config.llm.base_url,
            config.llm.embed_model,
            config.llm.generate_model
        );

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::from_client(
            Arc::clone(&ollama),
            config.embeddings.dimensions,
        ));
        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::from_client(ollama));

        let store: Arc<dyn VectorStoreProvider> = match config.vector_db.backend {
            VectorBackend::Qdrant => {
                tracing::info!(
                    "Using Qdrant at {} (collection '{}')",
                    config.vector_db.url,
                    config.vector_db.collection
                );
                Arc::new(QdrantStore::new(&config.vector_db)?)
            }
            VectorBackend::Memory => {
                tracing::warn!("Using in-memory vector store; points are lost on shutdown");
                Arc::new(MemoryVectorStore::new())
            }
        };

        Self::from_providers(config, embedder, store, llm)
    }

    /// Assemble state around existing providers. The configuration is
    /// validated before any provider is used.
    pub fn from_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let query_engine = QueryEngine::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            Arc::clone(&llm),
            config.query.top_k,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                store,
                llm,
                query_engine,
                ready: RwLock::new(false),
            }),
        })
    }

    /// Build an ingestion pipeline with the built-in extractors
    pub fn ingest_pipeline(&self) -> Result<IngestPipeline> {
        let config = &self.inner.config;
        let registry = ExtractorRegistry::with_defaults(&config.ingestion.ocr)?;
        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;

        Ok(IngestPipeline::new(
            registry,
            chunker,
            Arc::clone(&self.inner.embedder),
            Arc::clone(&self.inner.store),
        ))
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the vector store provider
    pub fn store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.inner.store
    }

    /// Get the generation provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get the query engine
    pub fn query_engine(&self) -> &QueryEngine {
        &self.inner.query_engine
    }

    /// Check if ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
