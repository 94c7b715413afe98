//! Chat-model access for the DatabaseAgent server.
//!
//! The pipeline talks to the model through the [`ChatModel`] seam: one
//! method for the structured query-generation stage, one for the free-text
//! answer stage. The production implementation is the OpenAI
//! chat-completions client in [`openai`].

mod openai;

pub use openai::{OPENAI_CHAT_COMPLETIONS_URL, OpenAiChat};

use async_trait::async_trait;

use crate::error::ToolResult;

/// One chat turn submitted to the model.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Model seam for the two pipeline stages.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Submit a prompt constrained to a single-field structured output and
    /// return the extracted SQL text.
    async fn generate_query(&self, messages: &[ChatMessage]) -> ToolResult<String>;

    /// Submit a prompt with no structural constraint and return free text.
    async fn generate_text(&self, messages: &[ChatMessage]) -> ToolResult<String>;
}
