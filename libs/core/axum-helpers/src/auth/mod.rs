//! JWT authentication and authorization.
//!
//! - [`JwtAuth`]: stateless HS256 token minting and verification
//! - [`optional_jwt_auth_middleware`]: resolves the caller into an
//!   [`AuthUser`] when a valid token is present, passes through otherwise
//! - [`AccessPolicy`]: the authorization seam; implementations decide
//!   whether a (possibly anonymous) caller may perform an action

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod policy;

pub use config::JwtConfig;
pub use jwt::{AuthUser, JwtAuth, JwtClaims, ACCESS_TOKEN_TTL};
pub use middleware::optional_jwt_auth_middleware;
pub use policy::{AccessPolicy, StaticPolicy};
