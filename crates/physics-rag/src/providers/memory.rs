//! In-process vector store with brute-force cosine search
//!
//! Nothing is persisted. Used for offline runs (`vector_db.backend = "memory"`)
//! and in tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::Point;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

#[derive(Default)]
struct Collection {
    dimensions: Option<usize>,
    points: Vec<Point>,
    /// Point id → position in `points`
    positions: HashMap<String, usize>,
}

/// Vector store kept in memory
#[derive(Default)]
pub struct MemoryVectorStore {
    inner: RwLock<Collection>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.inner.read().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored point, in insertion order
    pub fn points(&self) -> Vec<Point> {
        self.inner.read().points.clone()
    }
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.dimensions {
            Some(existing) if existing != dimensions => Err(Error::store(format!(
                "collection stores {}-dimensional vectors, configured dimension is {}",
                existing, dimensions
            ))),
            _ => {
                inner.dimensions = Some(dimensions);
                Ok(())
            }
        }
    }

    async fn upsert(&self, points: &[Point]) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(dimensions) = inner.dimensions {
            if let Some(bad) = points.iter().find(|p| p.vector.len() != dimensions) {
                return Err(Error::store(format!(
                    "point {} has {} dimensions, collection expects {}",
                    bad.id,
                    bad.vector.len(),
                    dimensions
                )));
            }
        }

        let collection = &mut *inner;
        for point in points {
            match collection.positions.get(&point.id) {
                Some(&i) => collection.points[i] = point.clone(),
                None => {
                    collection
                        .positions
                        .insert(point.id.clone(), collection.points.len());
                    collection.points.push(point.clone());
                }
            }
        }
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        let inner = self.inner.read();
        let mut results: Vec<VectorSearchResult> = inner
            .points
            .iter()
            .map(|point| VectorSearchResult {
                payload: point.payload.clone(),
                score: cosine_similarity(query_embedding, &point.vector),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Cosine similarity; 0 for zero-length or mismatched vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    fn point(text: &str, vector: Vec<f32>) -> Point {
        Point::from_chunk(Chunk::new(text, "a.txt", 0), vector)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_and_limits() {
        let store = MemoryVectorStore::new();
        store.ensure_collection(2).await.unwrap();
        store
            .upsert(&[
                point("east", vec![1.0, 0.0]),
                point("north", vec![0.0, 1.0]),
                point("north-east", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[0.9, 0.1], 2).await.unwrap();
        let texts: Vec<_> = results.iter().map(|r| r.payload.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "north-east"]);

        assert_eq!(store.search(&[0.9, 0.1], 10).await.unwrap().len(), 3);
        assert!(store.search(&[0.9, 0.1], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_collection_rejects_other_dimension() {
        let store = MemoryVectorStore::new();
        store.ensure_collection(4).await.unwrap();
        store.ensure_collection(4).await.unwrap();
        assert!(matches!(store.ensure_collection(8).await, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn test_upsert_checks_dimension_and_replaces_by_id() {
        let store = MemoryVectorStore::new();
        store.ensure_collection(2).await.unwrap();

        assert!(matches!(
            store.upsert(&[point("bad", vec![1.0, 2.0, 3.0])]).await,
            Err(Error::Store(_))
        ));
        assert!(store.is_empty());

        let mut p = point("v1", vec![1.0, 0.0]);
        store.upsert(&[p.clone()]).await.unwrap();
        p.payload.text = "v2".to_string();
        store.upsert(&[p]).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.points()[0].payload.text, "v2");
    }

    #[tokio::test]
    async fn test_replacement_keeps_position_among_many_points() {
        let store = MemoryVectorStore::new();
        store.ensure_collection(2).await.unwrap();

        let batch: Vec<Point> = (0..200)
            .map(|i| point(&format!("p{}", i), vec![1.0, i as f32]))
            .collect();
        store.upsert(&batch).await.unwrap();

        let mut replaced = batch[137].clone();
        replaced.payload.text = "replaced".to_string();
        store
            .upsert(&[replaced, point("extra", vec![0.0, 1.0])])
            .await
            .unwrap();

        let points = store.points();
        assert_eq!(points.len(), 201);
        assert_eq!(points[137].payload.text, "replaced");
        assert_eq!(points[136].payload.text, "p136");
        assert_eq!(points[200].payload.text, "extra");
    }
}
