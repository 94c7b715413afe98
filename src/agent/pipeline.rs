//! The generate / execute / answer pipeline.

use crate::agent::{PipelineState, prompts};
use crate::db::SqlBackend;
use crate::db::statement::classify_sql;
use crate::error::ToolResult;
use crate::llm::ChatModel;
use std::time::Instant;
use tracing::{debug, warn};

/// Run all three stages for one question.
///
/// Stages share state through [`PipelineState`] and any stage error aborts
/// the remainder, leaving later fields empty.
pub async fn run_pipeline(
    model: &dyn ChatModel,
    backend: &dyn SqlBackend,
    question: &str,
) -> ToolResult<PipelineState> {
    let mut state = PipelineState::new(question);
    generate_query(model, backend, &mut state).await?;
    execute_query(backend, &mut state).await?;
    generate_answer(model, &mut state).await?;
    Ok(state)
}

async fn generate_query(
    model: &dyn ChatModel,
    backend: &dyn SqlBackend,
    state: &mut PipelineState,
) -> ToolResult<()> {
    let start = Instant::now();
    let table_info = backend.table_info().await?;
    let messages = prompts::query_prompt(backend.dialect(), &table_info, &state.question);
    state.query = model.generate_query(&messages).await?;

    debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        query = %state.query,
        "Generated SQL query"
    );
    Ok(())
}

async fn execute_query(backend: &dyn SqlBackend, state: &mut PipelineState) -> ToolResult<()> {
    // The generated SQL runs as-is; anything beyond a plain read gets logged
    let kind = classify_sql(&state.query);
    if !kind.is_read_only() {
        warn!(
            kind = kind.label(),
            query = %state.query,
            "Generated statement is not a read-only query; executing verbatim"
        );
    }

    let start = Instant::now();
    state.result = backend.run_query(&state.query).await?;

    debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Executed generated query"
    );
    Ok(())
}

async fn generate_answer(model: &dyn ChatModel, state: &mut PipelineState) -> ToolResult<()> {
    let start = Instant::now();
    let messages = prompts::answer_prompt(&state.question, &state.query, &state.result);
    state.answer = model.generate_text(&messages).await?;

    debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Generated answer"
    );
    Ok(())
}
