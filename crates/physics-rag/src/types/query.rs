//! Query request types and the per-request stage machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub query: String,
}

/// Stages one query request passes through.
///
/// `Received → Embedding → Retrieving → Assembling → Generating → Completed`,
/// with any stage able to move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStage {
    Received,
    Embedding,
    Retrieving,
    Assembling,
    Generating,
    Completed,
    Failed,
}

impl QueryStage {
    /// The stage that follows on success; terminal stages stay put
    pub fn next(self) -> Self {
        match self {
            Self::Received => Self::Embedding,
            Self::Embedding => Self::Retrieving,
            Self::Retrieving => Self::Assembling,
            Self::Assembling => Self::Generating,
            Self::Generating => Self::Completed,
            Self::Completed => Self::Completed,
            Self::Failed => Self::Failed,
        }
    }

    /// Whether the request has finished, successfully or not
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Embedding => "embedding",
            Self::Retrieving => "retrieving",
            Self::Assembling => "assembling",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
