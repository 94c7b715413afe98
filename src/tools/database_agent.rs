//! Natural language database agent tool.
//!
//! This module implements the `database_agent` MCP tool. Each call checks
//! its preconditions (API key, then connection string), opens fresh
//! backends, runs the generate/execute/answer pipeline, and folds any
//! failure into the reply object so the caller always receives the same
//! shape.

use crate::agent::{PipelineState, run_pipeline};
use crate::config::{AgentConfig, ResolvedAgentConfig};
use crate::db::SqlBackend;
use crate::db::postgres::PgBackend;
use crate::error::{ToolError, ToolResult};
use crate::llm::{ChatModel, OpenAiChat};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Input for the database_agent tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DatabaseAgentInput {
    /// Natural language question about the database
    pub question: String,
}

/// Reply from the database_agent tool.
///
/// All four fields are always present. On failure `answer`, `query` and
/// `result` are empty and `error` names the reason; on success `error`
/// is null.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentReply {
    /// Natural language answer to the question
    pub answer: String,
    /// SQL query that was generated and executed
    pub query: String,
    /// Rows returned by the query, rendered as a JSON array string
    pub result: String,
    /// Failure reason, or null on success
    pub error: Option<String>,
}

impl AgentReply {
    fn success(state: PipelineState) -> Self {
        Self {
            answer: state.answer,
            query: state.query,
            result: state.result,
            error: None,
        }
    }

    fn failure(error: &ToolError) -> Self {
        Self {
            answer: String::new(),
            query: String::new(),
            result: String::new(),
            error: Some(format!("Error: {}", error)),
        }
    }
}

/// Factory for the model client and database connection used by one call.
///
/// Opening happens after the precondition check, so a reply produced for
/// missing configuration is guaranteed to involve no external traffic.
#[async_trait]
pub trait AgentBackends: Send + Sync {
    async fn open(
        &self,
        config: &ResolvedAgentConfig,
    ) -> ToolResult<(Arc<dyn ChatModel>, Arc<dyn SqlBackend>)>;
}

/// Production backends: OpenAI chat completions and a live PostgreSQL
/// connection, both scoped to the current call.
struct LiveBackends;

#[async_trait]
impl AgentBackends for LiveBackends {
    async fn open(
        &self,
        config: &ResolvedAgentConfig,
    ) -> ToolResult<(Arc<dyn ChatModel>, Arc<dyn SqlBackend>)> {
        let model = OpenAiChat::new(config.api_key.clone(), config.model.clone())?;
        let backend = PgBackend::connect(&config.database_url).await?;
        Ok((Arc::new(model), Arc::new(backend)))
    }
}

/// Handler for the database_agent tool.
#[derive(Clone)]
pub struct DatabaseAgent {
    config: AgentConfig,
    backends: Arc<dyn AgentBackends>,
}

impl DatabaseAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            backends: Arc::new(LiveBackends),
        }
    }

    /// Replace the live backends. Used by tests.
    pub fn with_backends(config: AgentConfig, backends: Arc<dyn AgentBackends>) -> Self {
        Self { config, backends }
    }

    /// Handle the database_agent tool call.
    ///
    /// Never fails at the protocol level: errors are folded into the
    /// reply's `error` field.
    pub async fn answer(&self, input: DatabaseAgentInput) -> AgentReply {
        match self.try_answer(&input).await {
            Ok(state) => AgentReply::success(state),
            Err(e) => {
                if e.is_precondition() {
                    debug!(error = %e, "Agent call rejected before any backend was opened");
                } else {
                    warn!(error = %e, "Database agent call failed");
                }
                AgentReply::failure(&e)
            }
        }
    }

    async fn try_answer(&self, input: &DatabaseAgentInput) -> ToolResult<PipelineState> {
        // Preconditions resolve before any client is constructed
        let resolved = self.config.resolve()?;
        let (model, backend) = self.backends.open(&resolved).await?;
        run_pipeline(model.as_ref(), backend.as_ref(), &input.question).await
    }
}
