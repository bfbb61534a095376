//! API routes for the RAG server

pub mod chat;

use axum::{routing::post, Router};
use crate::server::state::AppState;

/// Build the question-answering routes
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        // Path used by existing clients
        .route("/v1/chat", post(chat::chat))
}
