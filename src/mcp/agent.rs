//! MCP service for the database agent server.
//!
//! Exposes the single `database_agent` tool via the rmcp framework's macros.

use crate::tools::database_agent::{AgentReply, DatabaseAgent, DatabaseAgentInput};
use rmcp::{
    Json, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AgentService {
    /// Shared handler holding the agent configuration and backends
    agent: Arc<DatabaseAgent>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl AgentService {
    pub fn new(agent: Arc<DatabaseAgent>) -> Self {
        Self {
            agent,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl AgentService {
    #[tool(
        description = "Answer a natural language question about a PostgreSQL database.\nReturns a JSON object containing the answer, SQL query, and results."
    )]
    async fn database_agent(
        &self,
        Parameters(input): Parameters<DatabaseAgentInput>,
    ) -> Json<AgentReply> {
        Json(self.agent.answer(input).await)
    }
}

#[tool_handler]
impl ServerHandler for AgentService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "database-agent".to_owned(),
                title: Some("DatabaseAgent".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "You are a database expert tasked with answering natural language questions about a PostgreSQL database.\n\
                 Generate a syntactically correct PostgreSQL query to answer the question, execute it, and provide a natural language answer.\n\
                 - Limit results to 10 rows unless specified.\n\
                 - Select only relevant columns, avoiding `SELECT *`.\n\
                 - Use only existing table and column names from the schema.\n\
                 - Ensure proper table joins for multi-table queries.\n\
                 Return the final answer, SQL query, and results in JSON format."
                    .to_string(),
            ),
        }
    }
}
