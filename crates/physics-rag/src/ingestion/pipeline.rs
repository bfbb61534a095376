//! Ingestion run over a knowledge directory
//!
//! Files are processed one at a time in file-name order: extract, chunk, embed
//! every chunk, then write the file's points in one batched upsert. A file
//! that cannot be extracted is logged and skipped. Embedding and store
//! failures abort the whole run.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{Point, SourceFile};

use super::chunker::TextChunker;
use super::extractor::ExtractorRegistry;

/// A file left out of the run
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    /// File name
    pub file: String,
    /// Extraction error message
    pub reason: String,
}

/// Outcome of a completed ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Regular files found in the knowledge directory
    pub files_seen: usize,
    /// Files whose points were written (including files with no text)
    pub files_ingested: usize,
    /// Files skipped because extraction failed
    pub files_skipped: Vec<SkippedFile>,
    /// Points written across all files
    pub points_written: usize,
}

/// Main ingestion pipeline
pub struct IngestPipeline {
    registry: Arc<ExtractorRegistry>,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        registry: ExtractorRegistry,
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            chunker,
            embedder,
            store,
        }
    }

    /// Ingest every file directly under `knowledge_dir`, bounded by `deadline`
    pub async fn run(&self, knowledge_dir: &Path, deadline: Duration) -> Result<IngestReport> {
        match timeout(deadline, self.run_to_completion(knowledge_dir)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    "Ingestion of {} exceeded {}s",
                    knowledge_dir.display(),
                    deadline.as_secs()
                );
                Err(Error::Timeout {
                    operation: "ingestion",
                    secs: deadline.as_secs(),
                })
            }
        }
    }

    async fn run_to_completion(&self, knowledge_dir: &Path) -> Result<IngestReport> {
        let start = Instant::now();
        let files = list_files(knowledge_dir)?;
        tracing::info!(
            "Found {} knowledge files in {}",
            files.len(),
            knowledge_dir.display()
        );

        let mut report = IngestReport {
            files_seen: files.len(),
            ..IngestReport::default()
        };

        for file in &files {
            let text = match self.extract(file).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file.path.display(), e);
                    report.files_skipped.push(SkippedFile {
                        file: file.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            report.points_written += self.ingest_text(file, &text).await?;
            report.files_ingested += 1;
        }

        tracing::info!(
            "Ingestion complete: {} files ingested, {} skipped, {} points in {:.1}s",
            report.files_ingested,
            report.files_skipped.len(),
            report.points_written,
            start.elapsed().as_secs_f64()
        );

        Ok(report)
    }

    /// Extract on the blocking pool; a panicking extractor only loses its file
    async fn extract(&self, file: &SourceFile) -> Result<String> {
        let registry = Arc::clone(&self.registry);
        let path = file.path.clone();

        match tokio::task::spawn_blocking(move || registry.extract(&path)).await {
            Ok(result) => result,
            Err(e) => Err(Error::extraction(
                &file.path,
                format!("extractor panicked: {}", e),
            )),
        }
    }

    /// Chunk, embed and upsert one file's text; returns the points written
    async fn ingest_text(&self, file: &SourceFile, text: &str) -> Result<usize> {
        let chunks = self.chunker.chunk(text, &file.name);
        tracing::info!("{} split into {} chunks", file.name, chunks.len());

        if chunks.is_empty() {
            return Ok(0);
        }

        let dimensions = self.embedder.dimensions();
        let mut points = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let step = format!("embed chunk {}", chunk.index);
            let vector = self
                .embedder
                .embed(&chunk.text)
                .await
                .map_err(|e| Error::during_ingestion(&file.name, step.as_str(), e))?;

            if vector.len() != dimensions {
                return Err(Error::during_ingestion(
                    &file.name,
                    step,
                    Error::embedding(format!(
                        "expected {} dimensions, got {}",
                        dimensions,
                        vector.len()
                    )),
                ));
            }

            tracing::debug!("Embedded {} chunk {}", file.name, chunk.index);
            points.push(Point::from_chunk(chunk, vector));
        }

        self.store
            .upsert(&points)
            .await
            .map_err(|e| Error::during_ingestion(&file.name, "upsert", e))?;

        Ok(points.len())
    }
}

/// Regular files directly inside `dir`, sorted by name
fn list_files(dir: &Path) -> Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("knowledge directory {} does not exist", dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(SourceFile::new(entry.into_path()));
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::OcrConfig;
    use crate::providers::MemoryVectorStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::PathBuf;

    /// Embeds text as `[len, 1, 0]`; fails on texts containing `fail_on`
    struct FakeEmbedder {
        dimensions: usize,
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeEmbedder {
        fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                fail_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(marker: &'static str) -> Self {
            Self {
                fail_on: Some(marker),
                ..Self::new(3)
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.lock().push(text.to_string());
            if self.fail_on.is_some_and(|marker| text.contains(marker)) {
                return Err(Error::embedding("connection refused"));
            }
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Records batch sizes; can reject every write
    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<Point>>>,
        reject: bool,
    }

    #[async_trait]
    impl VectorStoreProvider for RecordingStore {
        async fn ensure_collection(&self, _dimensions: usize) -> Result<()> {
            Ok(())
        }

        async fn upsert(&self, points: &[Point]) -> Result<()> {
            if self.reject {
                return Err(Error::store("collection not found"));
            }
            self.batches.lock().push(points.to_vec());
            Ok(())
        }

        async fn search(&self, _query: &[f32], _top_k: usize) -> Result<Vec<crate::providers::VectorSearchResult>> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn pipeline(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> IngestPipeline {
        IngestPipeline::new(
            ExtractorRegistry::with_defaults(&OcrConfig::default()).unwrap(),
            TextChunker::new(500, 50).unwrap(),
            embedder,
            store,
        )
    }

    const DEADLINE: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn test_one_batch_per_file_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", &b"x".repeat(1200));
        write(dir.path(), "a.txt", b"Entropy measures disorder.");
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "deep.txt", b"not listed");

        let store = Arc::new(RecordingStore::default());
        let report = pipeline(Arc::new(FakeEmbedder::new(3)), store.clone())
            .run(dir.path(), DEADLINE)
            .await
            .unwrap();

        assert_eq!(report.files_seen, 2);
        assert_eq!(report.files_ingested, 2);
        assert_eq!(report.points_written, 4);

        let batches = store.batches.lock();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0].payload.source, "a.txt");
        assert_eq!(
            batches[1].iter().map(|p| p.payload.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(batches[1].iter().all(|p| p.payload.source == "b.txt"));
        // each vector belongs to its own chunk text
        assert!(batches[1]
            .iter()
            .all(|p| p.vector[0] == p.payload.text.len() as f32));
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.json", b"{not json");
        write(dir.path(), "ok.txt", b"Momentum is conserved.");

        let store = Arc::new(MemoryVectorStore::new());
        let report = pipeline(Arc::new(FakeEmbedder::new(3)), store.clone())
            .run(dir.path(), DEADLINE)
            .await
            .unwrap();

        assert_eq!(report.files_ingested, 1);
        assert_eq!(report.files_skipped.len(), 1);
        assert_eq!(report.files_skipped[0].file, "broken.json");
        assert!(report.files_skipped[0].reason.contains("invalid JSON"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_file_ingested_without_upsert() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "blank.txt", b"   \n\n  ");

        let store = Arc::new(RecordingStore::default());
        let embedder = Arc::new(FakeEmbedder::new(3));
        let report = pipeline(embedder.clone(), store.clone())
            .run(dir.path(), DEADLINE)
            .await
            .unwrap();

        assert_eq!(report.files_ingested, 1);
        assert_eq!(report.points_written, 0);
        assert!(store.batches.lock().is_empty());
        assert!(embedder.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut text = "a".repeat(600);
        text.push_str("BOOM");
        write(dir.path(), "a.txt", text.as_bytes());
        write(dir.path(), "b.txt", b"never reached");

        let store = Arc::new(RecordingStore::default());
        let embedder = Arc::new(FakeEmbedder::failing_on("BOOM"));
        let err = pipeline(embedder.clone(), store.clone())
            .run(dir.path(), DEADLINE)
            .await
            .unwrap_err();

        match &err {
            Error::Ingestion { file, step, source } => {
                assert_eq!(file, "a.txt");
                assert_eq!(step, "embed chunk 1");
                assert!(matches!(**source, Error::Embedding(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.kind(), "embedding_error");
        assert!(store.batches.lock().is_empty());
        assert!(!embedder.calls.lock().iter().any(|t| t == "never reached"));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"Force equals mass times acceleration.");

        let err = pipeline(
            Arc::new(FakeEmbedder::new(1024)),
            Arc::new(RecordingStore::default()),
        )
        .run(dir.path(), DEADLINE)
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "embedding_error");
        assert!(err.to_string().contains("expected 1024 dimensions, got 3"));
    }

    #[tokio::test]
    async fn test_store_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"Work is force times distance.");

        let store = Arc::new(RecordingStore {
            reject: true,
            ..RecordingStore::default()
        });
        let err = pipeline(Arc::new(FakeEmbedder::new(3)), store)
            .run(dir.path(), DEADLINE)
            .await
            .unwrap_err();

        assert!(matches!(&err, Error::Ingestion { step, .. } if step == "upsert"));
        assert_eq!(err.kind(), "store_error");
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline(
            Arc::new(FakeEmbedder::new(3)),
            Arc::new(RecordingStore::default()),
        )
        .run(&dir.path().join("missing"), DEADLINE)
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        struct SlowEmbedder;

        #[async_trait]
        impl EmbeddingProvider for SlowEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![0.0; 3])
            }

            fn dimensions(&self) -> usize {
                3
            }

            async fn health_check(&self) -> Result<bool> {
                Ok(true)
            }

            fn name(&self) -> &str {
                "slow"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"Power is work per unit time.");

        let err = pipeline(Arc::new(SlowEmbedder), Arc::new(RecordingStore::default()))
            .run(dir.path(), Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Timeout {
                operation: "ingestion",
                ..
            }
        ));
    }
}
