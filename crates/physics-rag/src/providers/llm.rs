//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;
use crate::generation::AssembledPrompt;

/// Trait for LLM-based answer generation
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (deepseek-r1, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for an optional system message and a user message
    async fn generate(&self, system: Option<&str>, user: &str) -> Result<String>;

    /// Generate a completion for an assembled RAG prompt
    async fn generate_prompt(&self, prompt: &AssembledPrompt) -> Result<String> {
        self.generate(Some(&prompt.system), &prompt.user).await
    }

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
