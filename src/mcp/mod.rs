//! MCP server integration module.
//!
//! This module wires the tool handlers into the MCP protocol using the
//! rmcp framework. Each server exposes exactly one tool and carries the
//! instructions its callers rely on.

pub mod agent;
pub mod email;

pub use agent::AgentService;
pub use email::EmailService;
