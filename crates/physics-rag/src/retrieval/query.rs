//! Query orchestration: embed, retrieve, assemble, generate

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::types::{Answer, QueryStage};

/// Answers one question at a time against the shared providers.
///
/// Holds no per-request state, so concurrent requests can share one engine.
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `query`, failing if the whole flow takes longer than `deadline`
    pub async fn answer(&self, query: &str, deadline: Duration) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(Error::InvalidRequest("query must not be empty".to_string()));
        }

        let start = Instant::now();
        let mut stage = QueryStage::Received;
        tracing::info!("Query: \"{}\"", query);

        let result = match timeout(deadline, self.run_stages(query, &mut stage)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation: "query",
                secs: deadline.as_secs(),
            }),
        };

        match &result {
            Ok(answer) => tracing::info!(
                "Query completed in {}ms with {} context passages",
                start.elapsed().as_millis(),
                answer.contexts.len()
            ),
            Err(e) => tracing::error!(
                "Query failed at stage {} -> {} ({}): {}",
                stage,
                QueryStage::Failed,
                e.kind(),
                e
            ),
        }

        result
    }

    async fn run_stages(&self, query: &str, stage: &mut QueryStage) -> Result<Answer> {
        advance(stage);
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| retag(e, Error::Embedding))?;

        advance(stage);
        let results = self
            .store
            .search(&embedding, self.top_k)
            .await
            .map_err(|e| retag(e, Error::Store))?;
        let contexts: Vec<String> = results
            .into_iter()
            .take(self.top_k)
            .map(|r| r.payload.text)
            .collect();
        if contexts.is_empty() {
            tracing::warn!("No passages retrieved, generating without context");
        }

        advance(stage);
        let prompt = PromptBuilder::assemble(query, &contexts);

        advance(stage);
        let response = self
            .llm
            .generate_prompt(&prompt)
            .await
            .map_err(|e| retag(e, Error::Generation))?;

        advance(stage);
        Ok(Answer {
            response,
            prompt,
            contexts,
        })
    }
}

fn advance(stage: &mut QueryStage) {
    *stage = stage.next();
    tracing::debug!("Query stage: {}", stage);
}

/// Keep a step's failure in that step's error class; timeouts pass through
fn retag(err: Error, class: fn(String) -> Error) -> Error {
    let expected = class(String::new()).kind();
    if err.kind() == expected || matches!(err, Error::Timeout { .. }) {
        err
    } else {
        class(err.to_string())
    }
}
