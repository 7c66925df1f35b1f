//! Wiring for the admin notification pipeline.
//!
//! In development emails are logged, not delivered. In production they
//! go out through SMTP, configured from the environment.

use async_trait::async_trait;
use std::sync::Arc;

use axum_helpers::auth::AuthUser;
use domain_catalog::{ChangeNotifier, ADMIN_GROUP};
use domain_notifications::{AdminNotifier, EmailProvider, LogProvider, SmtpProvider, TriggerUser};
use domain_users::{UserDirectory, UserRepository};
use tracing::info;

use crate::config::Environment;

/// Build the notifier backed by the user directory and the provider
/// matching the environment.
pub fn build_notifier(
    environment: &Environment,
    users: Arc<dyn UserRepository>,
) -> eyre::Result<Arc<AdminNotifier>> {
    let provider: Arc<dyn EmailProvider> = if environment.is_production() {
        Arc::new(SmtpProvider::from_env()?)
    } else {
        Arc::new(LogProvider::new())
    };

    info!(provider = provider.name(), "Email provider configured");

    let directory = Arc::new(UserDirectory::new(users));
    Ok(Arc::new(AdminNotifier::new(
        provider,
        directory,
        ADMIN_GROUP,
    )))
}

/// Adapts [`AdminNotifier`] to the catalog's [`ChangeNotifier`] seam.
pub struct AdminChangeNotifier {
    inner: Arc<AdminNotifier>,
}

impl AdminChangeNotifier {
    pub fn new(inner: Arc<AdminNotifier>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChangeNotifier for AdminChangeNotifier {
    async fn product_modified(&self, product_name: &str, actor: &AuthUser) -> eyre::Result<()> {
        let trigger = TriggerUser {
            email: actor.email.clone(),
            name: actor.name.clone(),
        };

        self.inner
            .notify_product_modified(product_name, &trigger)
            .await?;
        Ok(())
    }
}
