//! Core data types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{extension_key, Chunk, Point, PointPayload, SourceFile};
pub use query::{ChatRequest, QueryStage};
pub use response::{Answer, ChatResponse};
