//! MCP Agent Tools Library
//!
//! This library provides MCP (Model Context Protocol) tool servers for AI
//! assistants: an email sender backed by a fixed SMTP relay, and a natural
//! language database agent backed by a chat model and PostgreSQL.

pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod mail;
pub mod mcp;
pub mod tools;
pub mod transport;

pub use config::Cli;
pub use error::ToolError;
pub use mcp::{AgentService, EmailService};
