//! MCP service for the email server.
//!
//! Exposes the single `send_email` tool via the rmcp framework's macros.

use crate::tools::send_email::{EmailSender, SendEmailInput};
use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct EmailService {
    /// Shared handler holding relay configuration and transport
    sender: Arc<EmailSender>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl EmailService {
    pub fn new(sender: Arc<EmailSender>) -> Self {
        Self {
            sender,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl EmailService {
    #[tool(
        description = "Send an email to a specified recipient.\nUses a predefined SMTP server and requires the SMTP_USER and SMTP_PASSWORD environment variables.\nReturns a message indicating success or failure of the email sending process."
    )]
    async fn send_email(&self, Parameters(input): Parameters<SendEmailInput>) -> String {
        self.sender.send(input).await
    }
}

#[tool_handler]
impl ServerHandler for EmailService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "email-service".to_owned(),
                title: Some("EmailService".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "You are an email assistant that can send emails to customers \
                 with a predefined SMTP configuration."
                    .to_string(),
            ),
        }
    }
}
