//! Authorization seam between HTTP handlers and domain services.
//!
//! Services hold a `dyn AccessPolicy` and consult it before every write,
//! so the permission model can be swapped without touching the handlers.

use super::jwt::AuthUser;
use async_trait::async_trait;

/// Decides whether a caller may perform an action identified by a
/// permission codename (e.g. `"products.change"`).
///
/// `user` is `None` for anonymous callers.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn allows(&self, user: Option<&AuthUser>, permission: &str) -> eyre::Result<bool>;
}

/// Fixed-rule policy: reads are open to everyone, writes require
/// membership in a designated group.
///
/// Permission codenames follow the `<resource>.<action>` convention where
/// `view` is the only read action.
pub struct StaticPolicy {
    write_group: String,
}

impl StaticPolicy {
    pub fn new(write_group: impl Into<String>) -> Self {
        Self {
            write_group: write_group.into(),
        }
    }
}

#[async_trait]
impl AccessPolicy for StaticPolicy {
    async fn allows(&self, user: Option<&AuthUser>, permission: &str) -> eyre::Result<bool> {
        let is_read = permission
            .rsplit('.')
            .next()
            .is_some_and(|action| action == "view");

        if is_read {
            return Ok(true);
        }

        Ok(user.is_some_and(|u| u.in_group(&self.write_group)))
    }
}
