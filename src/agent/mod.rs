//! Natural-language database agent.
//!
//! Turns a question into a SQL query, runs it, and phrases the rows as a
//! natural language answer. The three stages run strictly in order and the
//! pipeline stops at the first failure, so a failed execution never reaches
//! the answer stage.

pub mod pipeline;
pub mod prompts;

pub use pipeline::run_pipeline;

/// Accumulated output of the pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub question: String,
    pub query: String,
    pub result: String,
    pub answer: String,
}

impl PipelineState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}
