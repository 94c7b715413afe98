//! STARTTLS delivery through a fixed SMTP relay.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::error::{ToolError, ToolResult};

use super::{DeliveryReceipt, MailTransport, OutboundMessage, RelayCredentials};

/// SMTP relay client for a fixed host/port pair.
///
/// A new transport is built for every delivery, so each call owns its own
/// connect, STARTTLS upgrade, authenticate and send sequence. Nothing is
/// cached or shared between invocations.
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn build_message(
        credentials: &RelayCredentials,
        message: &OutboundMessage,
    ) -> ToolResult<Message> {
        let from: Mailbox = credentials.user.parse()?;
        let to: Mailbox = message.to.parse()?;
        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;
        Ok(email)
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    async fn deliver(
        &self,
        credentials: &RelayCredentials,
        message: &OutboundMessage,
    ) -> ToolResult<DeliveryReceipt> {
        let email = Self::build_message(credentials, message)?;

        let transport: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
                .port(self.port)
                .credentials(Credentials::new(
                    credentials.user.clone(),
                    credentials.password.clone(),
                ))
                .build();

        let response = transport.send(email).await?;
        if !response.is_positive() {
            return Err(ToolError::smtp(format!(
                "relay rejected message with code {}",
                response.code()
            )));
        }

        let receipt = DeliveryReceipt {
            code: response.code().to_string(),
        };
        debug!(
            code = %receipt.code,
            detail = %response.message().collect::<Vec<_>>().join(" "),
            "Relay accepted message"
        );
        Ok(receipt)
    }
}
