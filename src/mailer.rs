//! # Email Dispatch
//!
//! Sends a rendered invoice PDF to the recipient. The [`Mailer`] trait
//! is the seam: production uses [`SmtpMailer`] over lettre's async SMTP
//! transport, tests use [`MockMailer`] and inspect what it captured.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::error::LekhaError;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One outgoing invoice email: a plain-text body plus the PDF.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub pdf: Vec<u8>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_invoice(&self, email: OutgoingEmail) -> Result<(), LekhaError>;
}

pub struct SmtpMailer {
    config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, LekhaError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| LekhaError::Email(format!("SMTP relay setup failed: {}", e)))?
            .port(config.port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        Ok(Self { config, transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_invoice(&self, email: OutgoingEmail) -> Result<(), LekhaError> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_address)
            .parse()
            .map_err(|e| LekhaError::Email(format!("invalid from address: {}", e)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| LekhaError::Email(format!("invalid recipient: {}", e)))?;

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| LekhaError::Email(format!("attachment type: {}", e)))?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body.clone()),
                    )
                    .singlepart(
                        Attachment::new(email.attachment_name.clone())
                            .body(email.pdf.clone(), pdf_type),
                    ),
            )
            .map_err(|e| LekhaError::Email(format!("message build failed: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| LekhaError::Email(format!("dispatch failed: {}", e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "invoice email sent");
        Ok(())
    }
}

/// Stand-in for deployments without SMTP settings. Every dispatch
/// fails with a clear message; nothing else is affected.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send_invoice(&self, email: OutgoingEmail) -> Result<(), LekhaError> {
        tracing::warn!(to = %email.to, "email requested but SMTP is not configured");
        Err(LekhaError::Email("SMTP is not configured".to_string()))
    }
}

/// Test double. Captures every send; flip `fail` to exercise the
/// unchanged-status path on dispatch failure.
#[derive(Default)]
pub struct MockMailer {
    pub fail: std::sync::atomic::AtomicBool,
    sent: tokio::sync::Mutex<Vec<OutgoingEmail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_invoice(&self, email: OutgoingEmail) -> Result<(), LekhaError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(LekhaError::Email("mock dispatch refused".to_string()));
        }
        tracing::info!(to = %email.to, "[mock] invoice email captured");
        self.sent.lock().await.push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_email() -> OutgoingEmail {
        OutgoingEmail {
            to: "accounts@sagar.example".to_string(),
            subject: "Invoice SAGT/25-26/001".to_string(),
            body: "Please find the invoice attached.".to_string(),
            attachment_name: "invoice-SAGT-25-26-001.pdf".to_string(),
            pdf: b"%PDF-1.3 stub".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_mock_captures_sends() {
        let mailer = MockMailer::new();
        mailer.send_invoice(sample_email()).await.unwrap();
        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "accounts@sagar.example");
        assert!(sent[0].pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_mock_failure_captures_nothing() {
        let mailer = MockMailer::new();
        mailer.set_fail(true);
        assert!(mailer.send_invoice(sample_email()).await.is_err());
        assert!(mailer.sent().await.is_empty());
    }

    #[test]
    fn test_smtp_mailer_builds_from_config() {
        let mailer = SmtpMailer::new(SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "billing".to_string(),
            password: "secret".to_string(),
            from_address: "billing@example.com".to_string(),
            from_name: "Billing Desk".to_string(),
        });
        assert!(mailer.is_ok());
    }
}
