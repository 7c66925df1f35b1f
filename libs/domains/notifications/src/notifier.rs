//! Admin change notifications.
//!
//! When an admin modifies a product, every other member of the admin
//! group receives an email about the change. Recipient resolution is
//! behind the [`RecipientDirectory`] trait so the user store stays
//! decoupled from delivery.

use crate::error::{NotificationError, NotificationResult};
use crate::providers::{EmailContent, EmailProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves the email addresses of a group's members.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// All email addresses of users belonging to `group`.
    async fn group_emails(&self, group: &str) -> NotificationResult<Vec<String>>;
}

/// The user who triggered a notification.
#[derive(Debug, Clone)]
pub struct TriggerUser {
    pub email: String,
    /// Display name used in the notification body.
    pub name: String,
}

/// Sends change notifications to admin group members.
///
/// Delivery failures propagate to the caller; there is no retry or
/// queueing, so a failed send surfaces as an error on the request
/// that triggered it.
pub struct AdminNotifier {
    provider: Arc<dyn EmailProvider>,
    directory: Arc<dyn RecipientDirectory>,
    admin_group: String,
}

impl AdminNotifier {
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        directory: Arc<dyn RecipientDirectory>,
        admin_group: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            directory,
            admin_group: admin_group.into(),
        }
    }

    /// Notify every admin other than `trigger` that `product_name` was
    /// modified.
    ///
    /// No-op when the trigger is the only admin. Returns the first
    /// delivery error encountered.
    pub async fn notify_product_modified(
        &self,
        product_name: &str,
        trigger: &TriggerUser,
    ) -> NotificationResult<()> {
        let recipients: Vec<String> = self
            .directory
            .group_emails(&self.admin_group)
            .await?
            .into_iter()
            .filter(|email| email != &trigger.email)
            .collect();

        if recipients.is_empty() {
            debug!(
                product = %product_name,
                trigger = %trigger.email,
                "No other admins to notify"
            );
            return Ok(());
        }

        let subject = format!("Product {} has been modified", product_name);
        let text_body = format!("User {} modified this product.", trigger.name);

        for recipient in &recipients {
            let email = EmailContent {
                to_email: recipient.clone(),
                to_name: String::new(),
                subject: subject.clone(),
                text_body: text_body.clone(),
            };

            self.provider.send(&email).await?;
        }

        info!(
            product = %product_name,
            trigger = %trigger.email,
            recipients = recipients.len(),
            provider = self.provider.name(),
            "Admins notified of product modification"
        );

        Ok(())
    }

    /// Health of the underlying delivery provider.
    pub async fn health_check(&self) -> NotificationResult<bool> {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SentEmail;
    use mockall::mock;
    use mockall::predicate::*;
    use std::sync::Mutex;

    mock! {
        Provider {}

        #[async_trait]
        impl EmailProvider for Provider {
            async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;
            fn name(&self) -> &'static str;
            async fn health_check(&self) -> NotificationResult<bool>;
        }
    }

    struct FixedDirectory(Vec<String>);

    #[async_trait]
    impl RecipientDirectory for FixedDirectory {
        async fn group_emails(&self, _group: &str) -> NotificationResult<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    /// Provider that records every message it is asked to send.
    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<EmailContent>>,
    }

    #[async_trait]
    impl EmailProvider for RecordingProvider {
        async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(SentEmail {
                message_id: None,
                accepted: true,
            })
        }

        fn name(&self) -> &'static str {
            "RECORDING"
        }

        async fn health_check(&self) -> NotificationResult<bool> {
            Ok(true)
        }
    }

    fn trigger() -> TriggerUser {
        TriggerUser {
            email: "ada@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notifies_every_other_admin() {
        let provider = Arc::new(RecordingProvider::default());
        let directory = Arc::new(FixedDirectory(vec![
            "ada@example.com".to_string(),
            "grace@example.com".to_string(),
            "alan@example.com".to_string(),
        ]));
        let notifier = AdminNotifier::new(provider.clone(), directory, "admin");

        notifier
            .notify_product_modified("Widget", &trigger())
            .await
            .unwrap();

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let recipients: Vec<_> = sent.iter().map(|e| e.to_email.as_str()).collect();
        assert!(recipients.contains(&"grace@example.com"));
        assert!(recipients.contains(&"alan@example.com"));
        assert!(!recipients.contains(&"ada@example.com"));
        assert_eq!(sent[0].subject, "Product Widget has been modified");
        assert_eq!(sent[0].text_body, "User Ada Lovelace modified this product.");
    }

    #[tokio::test]
    async fn test_no_op_when_trigger_is_only_admin() {
        let mut provider = MockProvider::new();
        provider.expect_send().times(0);

        let directory = Arc::new(FixedDirectory(vec!["ada@example.com".to_string()]));
        let notifier = AdminNotifier::new(Arc::new(provider), directory, "admin");

        notifier
            .notify_product_modified("Widget", &trigger())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let mut provider = MockProvider::new();
        provider.expect_send().returning(|_| {
            Err(NotificationError::ProviderError(
                "SMTP send failed".to_string(),
            ))
        });

        let directory = Arc::new(FixedDirectory(vec![
            "ada@example.com".to_string(),
            "grace@example.com".to_string(),
        ]));
        let notifier = AdminNotifier::new(Arc::new(provider), directory, "admin");

        let result = notifier.notify_product_modified("Widget", &trigger()).await;
        assert!(matches!(
            result,
            Err(NotificationError::ProviderError(_))
        ));
    }
}
