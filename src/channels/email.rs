//! SMTP delivery via lettre.

use async_trait::async_trait;
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::channels::{DeliveryReceipt, MessageDelivery};
use crate::config::SmtpConfig;
use crate::error::DeliveryError;

/// Sends HTML mail through an authenticated SMTP relay.
pub struct SmtpDelivery {
    config: SmtpConfig,
}

impl SmtpDelivery {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, DeliveryError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );

        Ok(SmtpTransport::relay(&self.config.host)
            .map_err(|e| DeliveryError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.config.port)
            .credentials(creds)
            .build())
    }
}

/// Build the MIME message. Returns it with its Message-ID.
fn build_message(
    sender: &str,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<(Message, String), DeliveryError> {
    let domain = sender.rsplit('@').next().unwrap_or("localhost");
    let message_id = format!("<{}@{}>", Uuid::new_v4(), domain);

    let email = Message::builder()
        .from(sender.parse().map_err(|e| DeliveryError::InvalidAddress {
            address: sender.to_string(),
            reason: format!("{e}"),
        })?)
        .to(recipient.parse().map_err(|e| DeliveryError::InvalidAddress {
            address: recipient.to_string(),
            reason: format!("{e}"),
        })?)
        .subject(subject)
        .message_id(Some(message_id.clone()))
        .header(ContentType::TEXT_HTML)
        .body(body.to_string())
        .map_err(|e| DeliveryError::Build(e.to_string()))?;

    Ok((email, message_id))
}

#[async_trait]
impl MessageDelivery for SmtpDelivery {
    async fn send(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let (email, message_id) = build_message(sender, recipient, subject, body)?;
        let transport = self.transport()?;

        // lettre's SmtpTransport blocks; keep it off the runtime threads.
        let response = tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| DeliveryError::Transport(format!("send task panicked: {e}")))?
            .map_err(|e| DeliveryError::Transport(format!("SMTP send failed: {e}")))?;

        if !response.is_positive() {
            return Err(DeliveryError::Rejected(format!(
                "{} {}",
                response.code(),
                response
                    .message()
                    .map(|line| line.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            )));
        }

        tracing::info!(recipient, message_id = %message_id, "Email sent");
        Ok(DeliveryReceipt {
            message_id,
            recipient: recipient.to_string(),
            accepted_at: Utc::now(),
        })
    }
}
