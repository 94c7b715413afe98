//! Streamable HTTP transport.
//!
//! Serves MCP over HTTP with SSE streaming through rmcp's
//! `StreamableHttpService`, mounted on an axum router. Each incoming
//! session gets its own clone of the hosted service.

use crate::error::{ToolError, ToolResult};
use crate::transport::Transport;
use rmcp::ServerHandler;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Window granted to open sessions after the first shutdown signal.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

/// Network listener hosting a service at a configurable endpoint path.
pub struct HttpTransport<S> {
    service: S,
    host: String,
    port: u16,
    /// Path the MCP service is mounted at, "/" for the root
    endpoint: String,
}

impl<S> HttpTransport<S>
where
    S: ServerHandler + Clone + Send + Sync + 'static,
{
    pub fn new(service: S, host: impl Into<String>, port: u16, endpoint: impl Into<String>) -> Self {
        Self {
            service,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<S> Transport for HttpTransport<S>
where
    S: ServerHandler + Clone + Send + Sync + 'static,
{
    async fn run(&self) -> ToolResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting MCP server with HTTP transport on {}", bind_addr);

        let session_service = self.service.clone();
        let service = StreamableHttpService::new(
            move || Ok(session_service.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects the bare root path
        let app = if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        };

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ToolError::transport(format!("Failed to bind to {}: {}", bind_addr, e)))?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown = Arc::new(tokio::sync::Notify::new());
        let notify = shutdown.clone();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            wait_for_signal().await;
            notify.notify_one();
        });

        // Open SSE streams can hold the graceful shutdown forever, so the
        // serving future races against the grace window
        tokio::select! {
            result = server => match result {
                Ok(()) => info!("HTTP server stopped"),
                Err(e) => {
                    error!(error = %e, "HTTP server error");
                    return Err(ToolError::transport(format!("HTTP server error: {}", e)));
                }
            },
            _ = grace_window(&shutdown) => {
                // Window elapsed or a second signal arrived, drop the server
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// After the first shutdown signal, waits out the grace window. A second
/// signal cuts the window short.
async fn grace_window(shutdown: &tokio::sync::Notify) {
    shutdown.notified().await;
    info!(
        timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
        "Waiting for connections to close (send signal again to force exit)..."
    );

    tokio::select! {
        _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
            warn!("Graceful shutdown timeout, forcing exit");
        }
        _ = wait_for_signal() => {
            warn!("Received second signal, forcing immediate exit");
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::mcp::AgentService;
    use crate::tools::database_agent::DatabaseAgent;

    fn create_test_service() -> AgentService {
        let config = AgentConfig {
            openai_api_key: None,
            database_url: None,
            model: "gpt-4o-mini".to_string(),
        };
        AgentService::new(Arc::new(DatabaseAgent::new(config)))
    }

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new(create_test_service(), "127.0.0.1", 8080, "/mcp");
        assert_eq!(transport.name(), "http");
        assert_eq!(transport.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_http_transport_default_binding() {
        let transport = HttpTransport::new(create_test_service(), "0.0.0.0", 8007, "/");
        assert_eq!(transport.bind_addr(), "0.0.0.0:8007");
        assert_eq!(transport.endpoint(), "/");
    }

    #[test]
    fn test_http_transport_custom_endpoint() {
        let transport = HttpTransport::new(create_test_service(), "127.0.0.1", 8080, "/custom/path");
        assert_eq!(transport.endpoint(), "/custom/path");
    }
}
