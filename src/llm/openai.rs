//! OpenAI chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ToolError, ToolResult};

use super::{ChatMessage, ChatModel};

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// The query-generation stage uses a JSON-schema response format so the
/// model must return a `{"query": ...}` object; the answer stage is plain
/// text. The endpoint is overridable for tests.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Structured output contract for the query-generation stage.
#[derive(Debug, Deserialize)]
struct GeneratedQuery {
    query: String,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> ToolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ToolError::model_request(e.to_string()))?;

        Ok(Self {
            client,
            api_url: OPENAI_CHAT_COMPLETIONS_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Point the client at a different chat-completions endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        response_format: Option<serde_json::Value>,
    ) -> ToolResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: 0.0,
            response_format,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::model_request(format!(
                "API responded with status code: {}",
                status
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ToolError::model_output(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::model_output("no choices in response"))?;
        Ok(choice.message.content)
    }

    /// JSON-schema constraint for the query stage: a single required
    /// `query` field holding SQL text.
    fn query_response_format() -> serde_json::Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": "sql_query",
                "description": "Generated SQL query.",
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Syntactically valid SQL query."
                        }
                    },
                    "required": ["query"],
                    "additionalProperties": false
                }
            }
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn generate_query(&self, messages: &[ChatMessage]) -> ToolResult<String> {
        let content = self
            .complete(messages, Some(Self::query_response_format()))
            .await?;
        let generated: GeneratedQuery = serde_json::from_str(&content).map_err(|e| {
            ToolError::model_output(format!("expected a {{\"query\": ...}} object: {}", e))
        })?;
        Ok(generated.query)
    }

    async fn generate_text(&self, messages: &[ChatMessage]) -> ToolResult<String> {
        self.complete(messages, None).await
    }
}
