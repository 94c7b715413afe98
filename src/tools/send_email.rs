//! Email delivery tool.
//!
//! This module implements the `send_email` MCP tool. Credentials are
//! validated before any network activity, one message is handed to the
//! relay per call, and every outcome (success or failure) is rendered
//! as a human-readable report string.

use crate::config::MailerConfig;
use crate::error::ToolResult;
use crate::mail::{MailTransport, OutboundMessage};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Input for the send_email tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SendEmailInput {
    /// Recipient email address
    pub to_email: String,
    /// Subject line of the email
    pub subject: String,
    /// Plain-text body of the email
    pub body: String,
}

/// Handler for the send_email tool.
///
/// Holds the relay configuration captured at startup and the transport
/// used for delivery. Credentials may be absent at construction; they
/// are checked on every call so a misconfigured server still starts and
/// reports the problem per request.
#[derive(Clone)]
pub struct EmailSender {
    config: MailerConfig,
    transport: Arc<dyn MailTransport>,
}

impl EmailSender {
    pub fn new(config: MailerConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    /// Handle the send_email tool call.
    ///
    /// Never fails at the protocol level: errors are folded into the
    /// returned report string.
    pub async fn send(&self, input: SendEmailInput) -> String {
        match self.try_send(&input).await {
            Ok(()) => {
                debug!(to = %input.to_email, "Email delivered");
                format!(
                    "Email successfully sent to {} with subject: {}",
                    input.to_email, input.subject
                )
            }
            Err(e) => {
                if e.is_precondition() {
                    debug!(to = %input.to_email, error = %e, "Email rejected before delivery");
                } else {
                    warn!(to = %input.to_email, error = %e, "Email delivery failed");
                }
                format!("Error sending email: {}", e)
            }
        }
    }

    async fn try_send(&self, input: &SendEmailInput) -> ToolResult<()> {
        // Credential check comes first so a misconfigured server fails
        // before any connection is opened
        let credentials = self.config.credentials()?;

        let message = OutboundMessage {
            to: input.to_email.clone(),
            subject: input.subject.clone(),
            body: input.body.clone(),
        };

        self.transport.deliver(&credentials, &message).await?;
        Ok(())
    }
}
