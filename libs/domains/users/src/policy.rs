//! Group-backed access policy.
//!
//! Mirrors the permission model where reads are open to everyone
//! (including anonymous callers) and writes require the caller to belong
//! to a group that carries the matching permission codename.

use async_trait::async_trait;
use axum_helpers::auth::{AccessPolicy, AuthUser};
use std::sync::Arc;

use crate::repository::GroupRepository;

/// Policy that resolves write permissions through stored groups.
///
/// A permission codename has the form `<resource>.<action>`, e.g.
/// `products.change`. The `view` action is always allowed; any other
/// action requires an authenticated caller whose groups include one
/// that holds the codename.
pub struct GroupPolicy {
    groups: Arc<dyn GroupRepository>,
}

impl GroupPolicy {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }
}

#[async_trait]
impl AccessPolicy for GroupPolicy {
    async fn allows(&self, user: Option<&AuthUser>, permission: &str) -> eyre::Result<bool> {
        let is_read = permission
            .rsplit('.')
            .next()
            .is_some_and(|action| action == "view");

        if is_read {
            return Ok(true);
        }

        let Some(user) = user else {
            return Ok(false);
        };

        for group_name in &user.groups {
            let group = self
                .groups
                .get_by_name(group_name)
                .await
                .map_err(|e| eyre::eyre!("Group lookup failed: {}", e))?;

            if let Some(group) = group {
                if group.has_permission(permission) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}
