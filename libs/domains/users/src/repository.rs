use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Group, User};

/// Repository trait for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Update an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Check if an email already exists
    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    /// Email addresses of active users belonging to the given group
    async fn emails_in_group(&self, group: &str) -> UserResult<Vec<String>>;
}

/// Repository trait for Group persistence
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Get a group by name
    async fn get_by_name(&self, name: &str) -> UserResult<Option<Group>>;

    /// Create the group if missing, otherwise replace its permission set.
    ///
    /// Returns the stored group; calling it repeatedly with the same
    /// arguments is a no-op.
    async fn upsert(&self, group: Group) -> UserResult<Group>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email_exists = users
            .values()
            .any(|u| u.email.to_lowercase() == user.email.to_lowercase());

        if email_exists {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned();
        Ok(user)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        let email_exists = users
            .values()
            .any(|u| u.id != user.id && u.email.to_lowercase() == user.email.to_lowercase());

        if email_exists {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        let exists = users
            .values()
            .any(|u| u.email.to_lowercase() == email.to_lowercase());
        Ok(exists)
    }

    async fn emails_in_group(&self, group: &str) -> UserResult<Vec<String>> {
        let users = self.users.read().await;
        let emails = users
            .values()
            .filter(|u| u.is_active && u.in_group(group))
            .map(|u| u.email.clone())
            .collect();
        Ok(emails)
    }
}

/// In-memory implementation of GroupRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<HashMap<String, Group>>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn get_by_name(&self, name: &str) -> UserResult<Option<Group>> {
        let groups = self.groups.read().await;
        Ok(groups.get(name).cloned())
    }

    async fn upsert(&self, group: Group) -> UserResult<Group> {
        let mut groups = self.groups.write().await;
        groups.insert(group.name.clone(), group.clone());
        tracing::info!(group = %group.name, permissions = group.permissions.len(), "Upserted group");
        Ok(group)
    }
}
