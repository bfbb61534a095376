//! Configuration for the RAG system
//!
//! Values are layered with Figment: built-in defaults, then an optional TOML
//! file, then `PHYSICS_RAG_*` environment variables (`__` separates sections,
//! e.g. `PHYSICS_RAG_CHUNKING__CHUNK_SIZE=800`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::ingestion::OcrConfig;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "physics-rag.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PHYSICS_RAG_";

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Vector database configuration
    pub vector_db: VectorDbConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Knowledge-directory ingestion
    pub ingestion: IngestionConfig,
    /// Query-time retrieval and generation
    pub query: QueryConfig,
}

impl RagConfig {
    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// With `path == None` the default file is used if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if path.is_some() && !file.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                file.display()
            )));
        }

        let config: RagConfig = Figment::from(Serialized::defaults(RagConfig::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make processing ill-defined
    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".to_string()));
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be greater than 0".to_string()));
        }
        if self.query.top_k == 0 {
            return Err(Error::Config("query top_k must be greater than 0".to_string()));
        }
        if self.ingestion.timeout_secs == 0 || self.query.timeout_secs == 0 {
            return Err(Error::Config("timeouts must be greater than 0".to_string()));
        }
        if self.vector_db.backend == VectorBackend::Qdrant && self.vector_db.collection.trim().is_empty() {
            return Err(Error::Config("vector_db.collection must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl ServerConfig {
    /// `host:port` listen address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "mxbai-embed-large".to_string(),
            generate_model: "deepseek-r1:14b".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding dimensions; must match the collection's vector size
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimensions: 1024 } // mxbai-embed-large
    }
}

/// Vector store backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Qdrant over its REST API
    #[default]
    Qdrant,
    /// In-process store, nothing persisted
    Memory,
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Backend to use
    pub backend: VectorBackend,
    /// Qdrant base URL
    pub url: String,
    /// Collection name
    pub collection: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Qdrant,
            url: "http://localhost:6333".to_string(),
            collection: "physics".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in bytes
    pub chunk_size: usize,
    /// Bytes repeated at the start of the next chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Flat directory of knowledge files
    pub knowledge_dir: PathBuf,
    /// Deadline for the whole ingestion run in seconds
    pub timeout_secs: u64,
    /// OCR tool used for scanned PDFs
    pub ocr: OcrConfig,
}

impl IngestionConfig {
    /// Deadline for the whole run
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: PathBuf::from("./knowledge"),
            timeout_secs: 600, // 10 minutes
            ocr: OcrConfig::default(),
        }
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Number of passages retrieved per question
    pub top_k: usize,
    /// Deadline for one request in seconds
    pub timeout_secs: u64,
}

impl QueryConfig {
    /// Deadline for one request
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            timeout_secs: 15,
        }
    }
}
