//! HTTP server for the RAG system

pub mod routes;
pub mod state;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::ingestion::IngestReport;
use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a server with the providers described by `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Create a server around prepared state
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Prepare the collection and optionally ingest the knowledge directory,
    /// then mark the server ready. Any error here is fatal for startup.
    pub async fn bootstrap(&self, ingest: bool) -> Result<Option<IngestReport>> {
        let config = self.state.config();

        if !self.state.embedder().health_check().await.unwrap_or(false) {
            tracing::warn!(
                "Embedding service {} not reachable at {}",
                self.state.embedder().name(),
                config.llm.base_url
            );
        }

        self.state
            .store()
            .ensure_collection(config.embeddings.dimensions)
            .await?;

        let report = if ingest {
            let pipeline = self.state.ingest_pipeline()?;
            let report = pipeline
                .run(&config.ingestion.knowledge_dir, config.ingestion.deadline())
                .await?;
            for skipped in &report.files_skipped {
                tracing::warn!("Not indexed: {} ({})", skipped.file, skipped.reason);
            }
            Some(report)
        } else {
            tracing::info!("Skipping knowledge ingestion");
            None
        };

        self.state.set_ready(true);
        Ok(report)
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .merge(routes::chat_routes())
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.state.config().server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Bind the configured address and serve until a shutdown signal
    pub async fn start(self) -> Result<()> {
        let addr = self.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Starting RAG server on http://{}", addr);
        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        self.state.config().server.address()
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, finishing in-flight requests");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorBackend;
    use crate::providers::{
        OllamaClient, OllamaEmbedder, OllamaLlm, VectorSearchResult, VectorStoreProvider,
    };
    use crate::types::Point;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Memory store and an Ollama address nothing listens on
    fn offline_config() -> RagConfig {
        let mut config = RagConfig::default();
        config.vector_db.backend = VectorBackend::Memory;
        config.llm.base_url = "http://127.0.0.1:9".to_string();
        config.llm.timeout_secs = 2;
        config
    }

    async fn spawn(server: RagServer) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = server.router();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let server = RagServer::new(offline_config()).unwrap();
        let state = server.state().clone();
        let base = spawn(server).await;
        let client = reqwest::Client::new();

        let health = client.get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(health.status(), 200);
        assert_eq!(health.text().await.unwrap(), "OK");

        let ready = client.get(format!("{}/ready", base)).send().await.unwrap();
        assert_eq!(ready.status(), 503);

        RagServer::with_state(state).bootstrap(false).await.unwrap();

        let ready = client.get(format!("{}/ready", base)).send().await.unwrap();
        assert_eq!(ready.status(), 200);
    }

    #[tokio::test]
    async fn test_bad_requests_are_400() {
        let base = spawn(RagServer::new(offline_config()).unwrap()).await;
        let client = reqwest::Client::new();

        for path in ["/chat", "/v1/chat"] {
            let malformed = client
                .post(format!("{}{}", base, path))
                .header("content-type", "application/json")
                .body("{\"query\": ")
                .send()
                .await
                .unwrap();
            assert_eq!(malformed.status(), 400);
            let body: Value = malformed.json().await.unwrap();
            assert!(body["error"].is_string());

            let missing = client
                .post(format!("{}{}", base, path))
                .json(&json!({"question": "What is entropy?"}))
                .send()
                .await
                .unwrap();
            assert_eq!(missing.status(), 400);

            let blank = client
                .post(format!("{}{}", base, path))
                .json(&json!({"query": "   "}))
                .send()
                .await
                .unwrap();
            assert_eq!(blank.status(), 400);
        }
    }

    #[tokio::test]
    async fn test_unreachable_embedding_service_is_502() {
        let base = spawn(RagServer::new(offline_config()).unwrap()).await;

        let response = reqwest::Client::new()
            .post(format!("{}/chat", base))
            .json(&json!({"query": "What is entropy?"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 502);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Embedding generation failed"));
    }

    /// Counts every call that reaches the store
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VectorStoreProvider for CountingStore {
        async fn ensure_collection(&self, _dimensions: usize) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn upsert(&self, _points: &[Point]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn search(&self, _query: &[f32], _top_k: usize) -> Result<Vec<VectorSearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_invalid_chunking_rejected_before_store_is_touched() {
        let mut config = offline_config();
        config.chunking.chunk_overlap = config.chunking.chunk_size;

        let client = Arc::new(OllamaClient::new(&config.llm).unwrap());
        let store = Arc::new(CountingStore::default());
        let result = AppState::from_providers(
            config.clone(),
            Arc::new(OllamaEmbedder::from_client(
                Arc::clone(&client),
                config.embeddings.dimensions,
            )),
            store.clone(),
            Arc::new(OllamaLlm::from_client(client)),
        );

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        assert!(matches!(RagServer::new(config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_fails_on_missing_knowledge_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config();
        config.ingestion.knowledge_dir = dir.path().join("missing");

        let server = RagServer::new(config).unwrap();
        assert!(server.bootstrap(true).await.is_err());
        assert!(!server.state().is_ready());
    }
}
