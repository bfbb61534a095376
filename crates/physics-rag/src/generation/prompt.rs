//! Prompt templates for grounded physics answers

use serde::{Deserialize, Serialize};

/// Persona and behavioral constraints sent as the system message
pub const SYSTEM_INSTRUCTION: &str = "You are an expert in physics. \
Answer questions about physics accurately, using the document excerpts you are given as your primary source. \
When the excerpts do not contain the answer, say so before drawing on general physics knowledge. \
Show formulas with their units and define every symbol you use. \
Answer in the language the question was asked in.";

/// Separator placed between retrieved passages
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// System and user messages for one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledPrompt {
    /// Fixed system instruction
    pub system: String,
    /// Template filled with the retrieved context and the question
    pub user: String,
}

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved passages with [`CONTEXT_SEPARATOR`]
    pub fn build_context(passages: &[String]) -> String {
        passages.join(CONTEXT_SEPARATOR)
    }

    /// Fill the user template with the context block and the question
    pub fn build_user_prompt(context: &str, question: &str) -> String {
        format!(
            "You are a physics expert. The following document excerpts are relevant to the user's question:\n\
             {context}\n\n\
             Using the excerpts above, answer the user's question: {question}"
        )
    }

    /// Build the full prompt for a question and its retrieved passages
    pub fn assemble(question: &str, passages: &[String]) -> AssembledPrompt {
        let context = Self::build_context(passages);
        AssembledPrompt {
            system: SYSTEM_INSTRUCTION.to_string(),
            user: Self::build_user_prompt(&context, question),
        }
    }
}
