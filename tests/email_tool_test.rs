//! Integration tests for the send_email tool.
//!
//! These tests substitute the SMTP transport seam to verify the report
//! strings and the tool's interaction with the relay: credentials are
//! checked before any delivery is attempted, each call hands exactly one
//! message to the transport, and failures are reported in-band.

use async_trait::async_trait;
use mcp_agent_tools::config::MailerConfig;
use mcp_agent_tools::error::{ToolError, ToolResult};
use mcp_agent_tools::mail::{DeliveryReceipt, MailTransport, OutboundMessage, RelayCredentials};
use mcp_agent_tools::tools::send_email::{EmailSender, SendEmailInput};
use std::sync::{Arc, Mutex};

/// Transport double that records every delivery it is asked to make.
struct RecordingTransport {
    delivered: Mutex<Vec<(RelayCredentials, OutboundMessage)>>,
    fail_with: Option<String>,
}

impl RecordingTransport {
    fn accepting() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    fn rejecting(reason: &str) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    fn delivery_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(
        &self,
        credentials: &RelayCredentials,
        message: &OutboundMessage,
    ) -> ToolResult<DeliveryReceipt> {
        self.delivered
            .lock()
            .unwrap()
            .push((credentials.clone(), message.clone()));

        match &self.fail_with {
            Some(reason) => Err(ToolError::smtp(reason.clone())),
            None => Ok(DeliveryReceipt {
                code: "250".to_string(),
            }),
        }
    }
}

fn mailer_config(user: Option<&str>, password: Option<&str>) -> MailerConfig {
    MailerConfig {
        smtp_user: user.map(String::from),
        smtp_password: password.map(String::from),
        relay_host: "smtp.gmail.com".to_string(),
        relay_port: 587,
    }
}

fn shipping_notice() -> SendEmailInput {
    SendEmailInput {
        to_email: "customer@example.com".to_string(),
        subject: "Your order shipped".to_string(),
        body: "Your package is on the way.".to_string(),
    }
}

/// A configured sender reports success naming the recipient and subject,
/// and hands exactly one message to the transport.
#[tokio::test]
async fn test_send_email_reports_success_with_recipient_and_subject() {
    let transport = Arc::new(RecordingTransport::accepting());
    let sender = EmailSender::new(
        mailer_config(Some("robot@gmail.com"), Some("app-password")),
        transport.clone(),
    );

    let report = sender.send(shipping_notice()).await;

    assert_eq!(
        report,
        "Email successfully sent to customer@example.com with subject: Your order shipped"
    );
    assert_eq!(transport.delivery_count(), 1, "exactly one delivery per call");

    let delivered = transport.delivered.lock().unwrap();
    let (credentials, message) = &delivered[0];
    assert_eq!(credentials.user, "robot@gmail.com");
    assert_eq!(credentials.password, "app-password");
    assert_eq!(message.to, "customer@example.com");
    assert_eq!(message.subject, "Your order shipped");
    assert_eq!(message.body, "Your package is on the way.");
}

/// Without credentials the tool reports the missing variables and never
/// touches the transport.
#[tokio::test]
async fn test_missing_credentials_never_touch_transport() {
    let transport = Arc::new(RecordingTransport::accepting());
    let sender = EmailSender::new(mailer_config(None, None), transport.clone());

    let report = sender.send(shipping_notice()).await;

    assert_eq!(
        report,
        "Error sending email: SMTP_USER and SMTP_PASSWORD environment variables are required"
    );
    assert_eq!(
        transport.delivery_count(),
        0,
        "credential failure must precede any transport activity"
    );
}

/// Empty-string credentials count as missing, same as absent ones.
#[tokio::test]
async fn test_empty_credentials_are_treated_as_missing() {
    let transport = Arc::new(RecordingTransport::accepting());
    let sender = EmailSender::new(mailer_config(Some(""), Some("pw")), transport.clone());

    let report = sender.send(shipping_notice()).await;

    assert!(
        report.contains("SMTP_USER and SMTP_PASSWORD environment variables are required"),
        "unexpected report: {}",
        report
    );
    assert_eq!(transport.delivery_count(), 0);
}

/// A transport failure surfaces its reason in the report string instead
/// of raising a protocol error.
#[tokio::test]
async fn test_transport_failure_is_reported_in_band() {
    let transport = Arc::new(RecordingTransport::rejecting(
        "535 authentication credentials invalid",
    ));
    let sender = EmailSender::new(
        mailer_config(Some("robot@gmail.com"), Some("wrong")),
        transport.clone(),
    );

    let report = sender.send(shipping_notice()).await;

    assert!(
        report.starts_with("Error sending email: "),
        "failure report must use the error prefix: {}",
        report
    );
    assert!(report.contains("535 authentication credentials invalid"));
    assert_eq!(transport.delivery_count(), 1);
}

/// Identical input yields an identical report on every call.
#[tokio::test]
async fn test_report_is_deterministic_for_identical_input() {
    let transport = Arc::new(RecordingTransport::accepting());
    let sender = EmailSender::new(
        mailer_config(Some("robot@gmail.com"), Some("app-password")),
        transport.clone(),
    );

    let first = sender.send(shipping_notice()).await;
    let second = sender.send(shipping_notice()).await;

    assert_eq!(first, second);
    assert_eq!(transport.delivery_count(), 2, "each call delivers anew");
}
