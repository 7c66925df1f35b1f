use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token time-to-live in seconds (15 minutes)
pub const ACCESS_TOKEN_TTL: i64 = 900;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,         // Subject (user ID)
    pub email: String,       // User email
    pub name: String,        // User display name
    pub groups: Vec<String>, // Group memberships
    pub exp: i64,            // Expiration time
    pub iat: i64,            // Issued at
    pub jti: String,         // JWT ID
}

/// Authenticated caller identity, resolved from verified JWT claims.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers via the `CurrentUser` extractor or `Option<AuthUser>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub groups: Vec<String>,
}

impl AuthUser {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

impl TryFrom<JwtClaims> for AuthUser {
    type Error = uuid::Error;

    fn try_from(claims: JwtClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&claims.sub)?,
            email: claims.email,
            name: claims.name,
            groups: claims.groups,
        })
    }
}

/// Stateless JWT authentication (HS256)
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
}

impl JwtAuth {
    /// Create a new JWT auth instance.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let jwt_auth = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
        }
    }

    /// Create access token (15 min)
    pub fn create_access_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        groups: &[String],
    ) -> eyre::Result<String> {
        self.create_token(user_id, email, name, groups, ACCESS_TOKEN_TTL)
    }

    /// Create JWT token with specified TTL
    fn create_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        groups: &[String],
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::seconds(ttl_seconds)).timestamp();
        let iat = now.timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            groups: groups.to_vec(),
            exp,
            iat,
            jti,
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-key-with-at-least-32-chars"))
    }

    #[test]
    fn test_create_and_verify_token() {
        let auth = test_auth();
        let user_id = Uuid::new_v4();
        let groups = vec!["admin".to_string()];

        let token = auth
            .create_access_token(&user_id.to_string(), "a@example.com", "Ada", &groups)
            .unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.groups, groups);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let auth = test_auth();
        let other = JwtAuth::new(&JwtConfig::new("another-secret-key-with-32-chars!!"));

        let token = auth
            .create_access_token(&Uuid::new_v4().to_string(), "a@example.com", "Ada", &[])
            .unwrap();

        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_auth_user_from_claims() {
        let id = Uuid::new_v4();
        let claims = JwtClaims {
            sub: id.to_string(),
            email: "a@example.com".to_string(),
            name: "Ada".to_string(),
            groups: vec!["admin".to_string()],
            exp: 0,
            iat: 0,
            jti: Uuid::new_v4().to_string(),
        };

        let user = AuthUser::try_from(claims).unwrap();
        assert_eq!(user.id, id);
        assert!(user.in_group("admin"));
        assert!(!user.in_group("staff"));
    }
}
