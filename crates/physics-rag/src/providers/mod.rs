//! Provider abstractions for embeddings, generation and vector storage
//!
//! The pipelines only see the traits, so the Ollama and Qdrant gateways can be
//! swapped for the in-memory store or for test doubles.

pub mod embedding;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod qdrant;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use memory::MemoryVectorStore;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use qdrant::QdrantStore;
pub use vector_store::{VectorSearchResult, VectorStoreProvider};
