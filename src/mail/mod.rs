//! Outbound mail for the EmailService server.
//!
//! One message per call, one relay session per message. The `MailTransport`
//! seam is what tests substitute; the production implementation lives in
//! [`relay`].

mod relay;

pub use relay::SmtpRelay;

use async_trait::async_trait;

use crate::error::ToolResult;

/// One plain-text message handed to the relay.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Credential pair for the relay. The user identity doubles as the
/// From address of the message.
#[derive(Debug, Clone)]
pub struct RelayCredentials {
    pub user: String,
    pub password: String,
}

/// Acceptance record returned by the relay for one message.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// SMTP reply code, e.g. "250".
    pub code: String,
}

/// Transport seam for delivering exactly one message per call.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(
        &self,
        credentials: &RelayCredentials,
        message: &OutboundMessage,
    ) -> ToolResult<DeliveryReceipt>;
}
