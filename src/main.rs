//! MCP Agent Tools - Main entry point.
//!
//! One binary hosting two MCP (Model Context Protocol) tool servers,
//! selected by subcommand: `email` runs the EmailService (send_email tool)
//! and `database` runs the DatabaseAgent (database_agent tool).

use clap::Parser;
use mcp_agent_tools::config::{Cli, ListenConfig, ServerCommand, TransportMode};
use mcp_agent_tools::config::{SMTP_RELAY_HOST, SMTP_RELAY_PORT};
use mcp_agent_tools::error::ToolResult;
use mcp_agent_tools::mail::SmtpRelay;
use mcp_agent_tools::mcp::{AgentService, EmailService};
use mcp_agent_tools::tools::database_agent::DatabaseAgent;
use mcp_agent_tools::tools::send_email::EmailSender;
use mcp_agent_tools::transport::{HttpTransport, StdioTransport, Transport};
use rmcp::ServerHandler;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr: with the stdio transport, stdout carries the
/// JSON-RPC stream and must stay clean.
fn init_tracing(log_level: &str, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Run the selected transport until shutdown.
async fn serve<S>(service: S, listen: &ListenConfig) -> ToolResult<()>
where
    S: ServerHandler + Clone + Send + Sync + 'static,
{
    match listen.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            StdioTransport::new(service).run().await
        }
        TransportMode::Http => {
            info!(
                host = %listen.http_host,
                port = listen.http_port,
                endpoint = %listen.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                service,
                &listen.http_host,
                listen.http_port,
                &listen.mcp_endpoint,
            )
            .run()
            .await
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(&cli.log_level, cli.json_logs);

    let result = match &cli.server {
        ServerCommand::Email(args) => {
            let listen = args.listen_config();
            info!(
                transport = %listen.transport,
                "Starting EmailService v{}",
                env!("CARGO_PKG_VERSION")
            );

            let relay = Arc::new(SmtpRelay::new(SMTP_RELAY_HOST, SMTP_RELAY_PORT));
            let sender = Arc::new(EmailSender::new(args.mailer_config(), relay));
            serve(EmailService::new(sender), &listen).await
        }
        ServerCommand::Database(args) => {
            let listen = args.listen_config();
            info!(
                transport = %listen.transport,
                model = %args.model,
                "Starting DatabaseAgent v{}",
                env!("CARGO_PKG_VERSION")
            );

            let agent = Arc::new(DatabaseAgent::new(args.agent_config()));
            serve(AgentService::new(agent), &listen).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
