//! Log-only email provider for development.
//!
//! Writes the destination and message to the application log instead of
//! delivering anything. This is the provider wired up when the service
//! runs in development mode.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::NotificationResult;
use async_trait::async_trait;
use tracing::info;

/// Email provider that logs messages instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogProvider;

impl LogProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailProvider for LogProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        info!(
            to = %email.to_email,
            subject = %email.subject,
            body = %email.text_body,
            "Email notification (log only, not delivered)"
        );

        Ok(SentEmail {
            message_id: None,
            accepted: true,
        })
    }

    fn name(&self) -> &'static str {
        "LOG"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_provider_accepts_everything() {
        let provider = LogProvider::new();
        let email = EmailContent {
            to_email: "admin@example.com".to_string(),
            to_name: "Admin".to_string(),
            subject: "Product Widget has been modified".to_string(),
            text_body: "User Ada modified this product.".to_string(),
        };

        let sent = provider.send(&email).await.unwrap();
        assert!(sent.accepted);
        assert!(sent.message_id.is_none());
    }
}
