//! Integration tests for the database_agent tool.
//!
//! These tests wire the agent to scripted model and database backends and
//! verify the reply contract: every call returns the same four-field
//! object, precondition failures involve no external traffic, the three
//! pipeline stages run in order, and a failed execution stops the run
//! before the answer stage.

use async_trait::async_trait;
use mcp_agent_tools::config::{AgentConfig, ResolvedAgentConfig};
use mcp_agent_tools::db::SqlBackend;
use mcp_agent_tools::error::{ToolError, ToolResult};
use mcp_agent_tools::llm::{ChatMessage, ChatModel};
use mcp_agent_tools::tools::{AgentBackends, DatabaseAgent, DatabaseAgentInput};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Model double that returns fixed completions and counts invocations
/// per stage.
struct ScriptedModel {
    query: String,
    answer: String,
    query_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(query: &str, answer: &str) -> Self {
        Self {
            query: query.to_string(),
            answer: answer.to_string(),
            query_calls: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate_query(&self, _messages: &[ChatMessage]) -> ToolResult<String> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.query.clone())
    }

    async fn generate_text(&self, _messages: &[ChatMessage]) -> ToolResult<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

/// Database double that serves a fixed schema and result set, or fails
/// query execution when configured to.
struct ScriptedBackend {
    rows: String,
    fail_run: Option<String>,
    info_calls: AtomicUsize,
    run_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn serving(rows: &str) -> Self {
        Self {
            rows: rows.to_string(),
            fail_run: None,
            info_calls: AtomicUsize::new(0),
            run_calls: AtomicUsize::new(0),
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            rows: String::new(),
            fail_run: Some(reason.to_string()),
            info_calls: AtomicUsize::new(0),
            run_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SqlBackend for ScriptedBackend {
    fn dialect(&self) -> &str {
        "PostgreSQL"
    }

    async fn table_info(&self) -> ToolResult<String> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        Ok("CREATE TABLE users (\n\tname VARCHAR NOT NULL\n)".to_string())
    }

    async fn run_query(&self, _sql: &str) -> ToolResult<String> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_run {
            Some(reason) => Err(ToolError::database(reason.clone(), Some("42P01".to_string()))),
            None => Ok(self.rows.clone()),
        }
    }
}

/// Backend factory that hands out shared scripted doubles, so tests can
/// assert call counters after the agent returns.
struct TestBackends {
    model: Arc<ScriptedModel>,
    backend: Arc<ScriptedBackend>,
    opens: AtomicUsize,
}

impl TestBackends {
    fn new(model: ScriptedModel, backend: ScriptedBackend) -> Self {
        Self {
            model: Arc::new(model),
            backend: Arc::new(backend),
            opens: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AgentBackends for TestBackends {
    async fn open(
        &self,
        _config: &ResolvedAgentConfig,
    ) -> ToolResult<(Arc<dyn ChatModel>, Arc<dyn SqlBackend>)> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok((self.model.clone(), self.backend.clone()))
    }
}

fn config(api_key: Option<&str>, database_url: Option<&str>) -> AgentConfig {
    AgentConfig {
        openai_api_key: api_key.map(String::from),
        database_url: database_url.map(String::from),
        model: "gpt-4o-mini".to_string(),
    }
}

fn users_question() -> DatabaseAgentInput {
    DatabaseAgentInput {
        question: "What are the names of the users?".to_string(),
    }
}

fn users_backends() -> Arc<TestBackends> {
    Arc::new(TestBackends::new(
        ScriptedModel::new(
            "SELECT name FROM users LIMIT 10",
            "The users are Alice and Bob.",
        ),
        ScriptedBackend::serving(r#"[{"name":"Alice"},{"name":"Bob"}]"#),
    ))
}

/// Without an API key the reply carries the error and empty fields, and
/// neither the model nor the database is ever contacted.
#[tokio::test]
async fn test_missing_api_key_returns_error_with_no_traffic() {
    let backends = users_backends();
    let agent = DatabaseAgent::with_backends(
        config(None, Some("postgresql://localhost/app")),
        backends.clone(),
    );

    let reply = agent.answer(users_question()).await;

    assert_eq!(reply.answer, "", "answer must be empty on failure");
    assert_eq!(reply.query, "", "query must be empty on failure");
    assert_eq!(reply.result, "", "result must be empty on failure");
    assert_eq!(
        reply.error.as_deref(),
        Some("Error: OPENAI_API_KEY environment variable is required")
    );
    assert_eq!(backends.opens.load(Ordering::SeqCst), 0, "no backend opened");
    assert_eq!(backends.model.query_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backends.backend.run_calls.load(Ordering::SeqCst), 0);
}

/// Without a connection string the reply names POSTGRESQL_URL.
#[tokio::test]
async fn test_missing_database_url_returns_error_with_no_traffic() {
    let backends = users_backends();
    let agent = DatabaseAgent::with_backends(config(Some("sk-test"), None), backends.clone());

    let reply = agent.answer(users_question()).await;

    assert_eq!(
        reply.error.as_deref(),
        Some("Error: POSTGRESQL_URL environment variable is required")
    );
    assert_eq!(backends.opens.load(Ordering::SeqCst), 0);
}

/// When both values are missing, the API key is reported first.
#[tokio::test]
async fn test_api_key_is_checked_before_database_url() {
    let backends = users_backends();
    let agent = DatabaseAgent::with_backends(config(None, None), backends);

    let reply = agent.answer(users_question()).await;

    assert_eq!(
        reply.error.as_deref(),
        Some("Error: OPENAI_API_KEY environment variable is required"),
        "the API key precondition runs first"
    );
}

/// A fully configured agent runs generate, execute, and answer once each
/// and returns all three artifacts with a null error.
#[tokio::test]
async fn test_successful_run_populates_all_fields() {
    let backends = users_backends();
    let agent = DatabaseAgent::with_backends(
        config(Some("sk-test"), Some("postgresql://localhost/app")),
        backends.clone(),
    );

    let reply = agent.answer(users_question()).await;

    assert_eq!(reply.query, "SELECT name FROM users LIMIT 10");
    assert!(reply.result.contains("Alice"), "result rows must survive: {}", reply.result);
    assert!(reply.result.contains("Bob"));
    assert_eq!(reply.answer, "The users are Alice and Bob.");
    assert!(reply.error.is_none(), "success must carry a null error");

    assert_eq!(backends.opens.load(Ordering::SeqCst), 1);
    assert_eq!(backends.model.query_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backends.backend.info_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backends.backend.run_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backends.model.text_calls.load(Ordering::SeqCst), 1);
}

/// A failed query execution aborts the run before the answer stage.
#[tokio::test]
async fn test_execution_failure_skips_answer_stage() {
    let backends = Arc::new(TestBackends::new(
        ScriptedModel::new("SELECT name FROM userz LIMIT 10", "unused"),
        ScriptedBackend::failing(r#"relation "userz" does not exist"#),
    ));
    let agent = DatabaseAgent::with_backends(
        config(Some("sk-test"), Some("postgresql://localhost/app")),
        backends.clone(),
    );

    let reply = agent.answer(users_question()).await;

    assert_eq!(reply.answer, "");
    assert_eq!(reply.query, "");
    assert_eq!(reply.result, "");
    let error = reply.error.as_deref().unwrap();
    assert!(error.starts_with("Error: "), "unexpected error: {}", error);
    assert!(error.contains(r#"relation "userz" does not exist"#));
    assert_eq!(
        backends.model.text_calls.load(Ordering::SeqCst),
        0,
        "answer stage must not run after a failed execution"
    );
    assert_eq!(backends.backend.run_calls.load(Ordering::SeqCst), 1);
}

/// Identical questions over deterministic backends produce identical
/// replies, with a fresh backend opened for each call.
#[tokio::test]
async fn test_identical_questions_produce_identical_replies() {
    let backends = users_backends();
    let agent = DatabaseAgent::with_backends(
        config(Some("sk-test"), Some("postgresql://localhost/app")),
        backends.clone(),
    );

    let first = agent.answer(users_question()).await;
    let second = agent.answer(users_question()).await;

    assert_eq!(first.answer, second.answer);
    assert_eq!(first.query, second.query);
    assert_eq!(first.result, second.result);
    assert_eq!(first.error, second.error);
    assert_eq!(backends.opens.load(Ordering::SeqCst), 2, "backends open per call");
}

/// The serialized reply always has all four keys, with `error` rendered
/// as JSON null on success.
#[tokio::test]
async fn test_reply_serializes_with_null_error() {
    let backends = users_backends();
    let agent = DatabaseAgent::with_backends(
        config(Some("sk-test"), Some("postgresql://localhost/app")),
        backends,
    );

    let reply = agent.answer(users_question()).await;
    let json = serde_json::to_value(&reply).unwrap();

    assert!(json.get("answer").is_some());
    assert!(json.get("query").is_some());
    assert!(json.get("result").is_some());
    assert!(json["error"].is_null(), "error key must be present and null");
}
