//! Transports hosting the MCP servers.
//!
//! Two ways to reach a server, picked at startup: [`StdioTransport`] for
//! direct agent embedding and [`HttpTransport`] for network clients. Both
//! are generic over the hosted service, so the email and database servers
//! share the same plumbing.

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::error::ToolResult;
use std::future::Future;

/// A way of serving an MCP service to clients.
pub trait Transport: Send + Sync {
    /// Serve until the client disconnects or a shutdown signal arrives.
    fn run(&self) -> impl Future<Output = ToolResult<()>> + Send;

    /// Short transport name for logging.
    fn name(&self) -> &'static str;
}
