//! Prompt assembly for answer generation

pub mod prompt;

pub use prompt::{AssembledPrompt, PromptBuilder, CONTEXT_SEPARATOR, SYSTEM_INSTRUCTION};
