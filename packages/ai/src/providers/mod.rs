//! LLM provider abstraction.
//!
//! One trait, one completion call. The pipeline only ever needs a
//! system prompt plus a user prompt and the completion text back; no
//! tool use, no streaming.

mod openai;

pub use openai::OpenAiProvider;

use crate::AiError;

/// A chat-completion provider.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends one system + user prompt pair and returns the completion
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the provider returns
    /// no completion.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AiError>;
}
