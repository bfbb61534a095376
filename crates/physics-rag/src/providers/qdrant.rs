//! Qdrant vector store over its REST API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::{Point, PointPayload};

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Qdrant collection client
pub struct QdrantStore {
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    collection: String,
}

#[derive(Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Deserialize)]
struct CollectionParams {
    /// A single unnamed vector config carries `size`; named vectors do not
    vectors: serde_json::Value,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    points: &'a [Point],
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Deserialize)]
struct QueryResult {
    points: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    payload: Option<StoredPayload>,
}

/// Payload as found in the collection; points written by other tools may
/// lack the source fields
#[derive(Deserialize)]
struct StoredPayload {
    text: Option<String>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    index: usize,
}

impl QdrantStore {
    /// Create a client for the configured collection
    pub fn new(config: &VectorDbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    async fn create_collection(&self, dimensions: usize) -> Result<()> {
        let body = json!({
            "vectors": {
                "size": dimensions,
                "distance": "Cosine",
            }
        });

        let response = self
            .client
            .put(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::store(format!("create collection request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::store(format!(
                "create collection '{}' failed: HTTP {} - {}",
                self.collection,
                status,
                body.trim()
            )));
        }

        tracing::info!(
            "Created Qdrant collection '{}' ({} dimensions, cosine)",
            self.collection,
            dimensions
        );
        Ok(())
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantStore {
    async fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| Error::store(format!("collection lookup failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            tracing::debug!(
                "Collection '{}' lookup returned {}, creating it",
                self.collection,
                response.status()
            );
            return self.create_collection(dimensions).await;
        }

        let info: CollectionInfoResponse = response
            .json()
            .await
            .map_err(|e| Error::store(format!("failed to parse collection info: {}", e)))?;

        if let Some(size) = info.result.config.params.vectors.get("size").and_then(|s| s.as_u64()) {
            if size as usize != dimensions {
                return Err(Error::store(format!(
                    "collection '{}' stores {}-dimensional vectors, configured dimension is {}",
                    self.collection, size, dimensions
                )));
            }
        }

        tracing::info!("Using existing Qdrant collection '{}'", self.collection);
        Ok(())
    }

    async fn upsert(&self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let url = format!("{}/points?wait=true", self.collection_url());
        let response = self
            .client
            .put(&url)
            .json(&UpsertRequest { points })
            .send()
            .await
            .map_err(|e| Error::store(format!("upsert request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::store(format!("upsert failed: HTTP {} - {}", status, body.trim())));
        }

        tracing::debug!("Upserted {} points into '{}'", points.len(), self.collection);
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        let url = format!("{}/points/query", self.collection_url());
        let request = QueryRequest {
            query: query_embedding,
            limit: top_k,
            with_payload: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::store(format!("search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::store(format!("search failed: HTTP {} - {}", status, body.trim())));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::store(format!("failed to parse search response: {}", e)))?;

        Ok(query_response
            .result
            .points
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload?;
                Some(VectorSearchResult {
                    payload: PointPayload {
                        text: payload.text?,
                        source: payload.source,
                        index: payload.index,
                    },
                    score: point.score,
                })
            })
            .take(top_k)
            .collect())
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.get(format!("{}/collections", self.base_url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
