//! Stdio transport.
//!
//! Serves one MCP session over standard input/output, the usual mode when
//! an agent runtime spawns the server as a child process. Log output never
//! goes to stdout, which belongs to the JSON-RPC stream.

use crate::error::{ToolError, ToolResult};
use crate::transport::Transport;
use rmcp::{ServerHandler, ServiceExt, transport::stdio};
use tokio::signal;
use tracing::{info, warn};

/// Hosts a service on stdin/stdout until the client disconnects or a
/// shutdown signal arrives.
pub struct StdioTransport<S> {
    service: S,
}

impl<S> StdioTransport<S>
where
    S: ServerHandler + Clone + Send + Sync + 'static,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S> Transport for StdioTransport<S>
where
    S: ServerHandler + Clone + Send + Sync + 'static,
{
    async fn run(&self) -> ToolResult<()> {
        info!("Starting MCP server with stdio transport");

        let running = self
            .service
            .clone()
            .serve(stdio())
            .await
            .map_err(|e| ToolError::transport(format!("Failed to start stdio transport: {}", e)))?;

        tokio::select! {
            result = running.waiting() => match result {
                Ok(_quit_reason) => {
                    info!("Stdio transport completed normally");
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "Stdio transport error");
                    Err(ToolError::transport(format!("Stdio transport error: {}", e)))
                }
            },
            _ = wait_for_signal() => {
                // stdin reads block and cannot be interrupted, so exit
                // here instead of waiting for the reader to notice
                info!("Shutdown signal received, exiting");
                std::process::exit(0);
            }
        }
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
