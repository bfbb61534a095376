//! physics-rag: retrieval-augmented question answering over a physics knowledge base
//!
//! Files in a flat knowledge directory are converted to text by a
//! per-format extractor, split into overlapping chunks, embedded through
//! Ollama and stored as points in a vector store (Qdrant or in-memory).
//! Questions are answered by embedding them, retrieving the nearest chunks and
//! asking the generation model with those chunks as context.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{ExtractorRegistry, IngestPipeline, IngestReport, TextChunker};
pub use retrieval::QueryEngine;
pub use types::{Answer, ChatRequest, ChatResponse, Chunk, Point, QueryStage};
