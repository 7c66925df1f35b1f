use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Create a new user with password hashing
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let password_hash = self.hash_password(&input.password)?;

        let user = User::new(input.email, input.name, password_hash, input.groups);

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// Update a user
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let new_password_hash = if let Some(ref password) = input.password {
            Some(self.hash_password(password)?)
        } else {
            None
        };

        if let Some(ref new_email) = input.email {
            if new_email.to_lowercase() != user.email.to_lowercase()
                && self.repository.email_exists(new_email).await?
            {
                return Err(UserError::DuplicateEmail(new_email.clone()));
            }
        }

        user.apply_update(input, new_password_hash);

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    /// Verify user credentials (for login).
    ///
    /// Returns the full user so the caller can mint a token with the
    /// user's group memberships.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active {
            return Err(UserError::InvalidCredentials);
        }

        if !self.verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn create_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password: "correct horse battery".to_string(),
            groups: vec!["admin".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let svc = service();
        let created = svc.create_user(create_input("a@example.com")).await.unwrap();
        assert_eq!(created.email, "a@example.com");
        assert_eq!(created.groups, vec!["admin".to_string()]);
    }

    #[tokio::test]
    async fn test_verify_credentials_roundtrip() {
        let svc = service();
        svc.create_user(create_input("a@example.com")).await.unwrap();

        let user = svc
            .verify_credentials("a@example.com", "correct horse battery")
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");

        let wrong = svc.verify_credentials("a@example.com", "wrong").await;
        assert!(matches!(wrong, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verify_credentials_unknown_email() {
        let svc = service();
        let result = svc.verify_credentials("nobody@example.com", "pw").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_login() {
        let svc = service();
        let created = svc.create_user(create_input("a@example.com")).await.unwrap();

        svc.update_user(
            created.id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let result = svc
            .verify_credentials("a@example.com", "correct horse battery")
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }
}
