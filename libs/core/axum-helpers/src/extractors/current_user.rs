//! Extractor for the authenticated user placed in request extensions
//! by the JWT middleware.

use crate::auth::AuthUser;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Extracts the authenticated user from request extensions.
///
/// Requires `optional_jwt_auth_middleware` (or a stricter variant) to run
/// first. Returns 401 if no valid token was presented.
///
/// For handlers that serve both anonymous and authenticated callers, read
/// `Option<AuthUser>` from extensions instead.
pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
