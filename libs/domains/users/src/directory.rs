//! Recipient resolution for admin notifications.

use async_trait::async_trait;
use domain_notifications::{NotificationError, NotificationResult, RecipientDirectory};
use std::sync::Arc;

use crate::repository::UserRepository;

/// Resolves notification recipients from the user store.
pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl RecipientDirectory for UserDirectory {
    async fn group_emails(&self, group: &str) -> NotificationResult<Vec<String>> {
        self.users
            .emails_in_group(group)
            .await
            .map_err(|e| NotificationError::RecipientLookup(e.to_string()))
    }
}
