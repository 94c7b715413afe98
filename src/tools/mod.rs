//! MCP tool implementations.
//!
//! This module contains the two tool handlers:
//! - `send_email`: Deliver a plain-text email through the fixed SMTP relay
//! - `database_agent`: Answer a natural language question about a PostgreSQL database
//!
//! Both handlers report failures in-band: `send_email` returns a
//! human-readable report string and `database_agent` always returns a
//! well-formed reply object, never a protocol error.

pub mod database_agent;
pub mod send_email;

pub use database_agent::{AgentBackends, AgentReply, DatabaseAgent, DatabaseAgentInput};
pub use send_email::{EmailSender, SendEmailInput};
