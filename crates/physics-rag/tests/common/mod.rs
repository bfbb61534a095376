//! Provider doubles shared by the end-to-end tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use physics_rag::config::{RagConfig, VectorBackend};
use physics_rag::providers::{EmbeddingProvider, LlmProvider, MemoryVectorStore};
use physics_rag::server::state::AppState;
use physics_rag::{Error, Result};

pub const DIMENSIONS: usize = 26;

/// Letter-frequency embeddings: deterministic and similar for similar words
pub struct LetterEmbedder {
    pub fail: bool,
    pub calls: Mutex<usize>,
}

impl LetterEmbedder {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock() += 1;
        if self.fail {
            return Err(Error::embedding("HTTP 503 Service Unavailable - model is loading"));
        }

        let mut vector = vec![0.0f32; DIMENSIONS];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        // keep blank-ish texts off the zero vector
        vector[0] += 0.01;
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }

    fn name(&self) -> &str {
        "letters"
    }
}

/// Answers with a fixed sentence and keeps every user prompt
#[derive(Default)]
pub struct RecordingLlm {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn generate(&self, _system: Option<&str>, user: &str) -> Result<String> {
        self.prompts.lock().push(user.to_string());
        Ok("Entropy quantifies the number of microstates of a system.".to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "recording-model"
    }
}

pub fn config(knowledge_dir: &Path) -> RagConfig {
    let mut config = RagConfig::default();
    config.vector_db.backend = VectorBackend::Memory;
    config.embeddings.dimensions = DIMENSIONS;
    config.ingestion.knowledge_dir = knowledge_dir.to_path_buf();
    config
}

pub struct Harness {
    pub state: AppState,
    pub embedder: Arc<LetterEmbedder>,
    pub store: Arc<MemoryVectorStore>,
    pub llm: Arc<RecordingLlm>,
}

pub fn harness(config: RagConfig, embedder: LetterEmbedder) -> Harness {
    let embedder = Arc::new(embedder);
    let store = Arc::new(MemoryVectorStore::new());
    let llm = Arc::new(RecordingLlm::default());
    let state = AppState::from_providers(config, embedder.clone(), store.clone(), llm.clone())
        .expect("test config is valid");

    Harness {
        state,
        embedder,
        store,
        llm,
    }
}

pub fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
