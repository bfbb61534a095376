//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{Point, PointPayload};

/// Search result from vector store
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchResult {
    /// Stored payload of the matched point
    pub payload: PointPayload,
    /// Similarity score (higher is more similar)
    pub score: f32,
}

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `QdrantStore`: Qdrant over its HTTP API
/// - `MemoryVectorStore`: in-process cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Create the collection if it does not exist. Idempotent; fails if an
    /// existing collection was created for a different vector size.
    async fn ensure_collection(&self, dimensions: usize) -> Result<()>;

    /// Write a batch of points in one call
    async fn upsert(&self, points: &[Point]) -> Result<()>;

    /// Nearest points to `query_embedding`, most similar first, at most `top_k`
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
