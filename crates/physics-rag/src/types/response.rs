//! Response types for RAG queries

use serde::{Deserialize, Serialize};

use crate::generation::AssembledPrompt;

/// Body of a successful `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer, verbatim from the model
    pub response: String,
}

/// Everything a query produced
#[derive(Debug, Clone)]
pub struct Answer {
    /// Generated answer text
    pub response: String,
    /// Prompt sent to the generation endpoint
    pub prompt: AssembledPrompt,
    /// Retrieved passages, most similar first
    pub contexts: Vec<String>,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        Self {
            response: answer.response,
        }
    }
}
