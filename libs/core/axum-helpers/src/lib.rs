//! # Axum Helpers
//!
//! Utilities, middleware, and helpers for the catalog service's HTTP layer.
//!
//! ## Modules
//!
//! - **[`auth`]**: JWT authentication and the [`AccessPolicy`] authorization seam
//! - **[`server`]**: Server setup, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (security headers)
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (validated JSON, current user)
//! - **[`audit`]**: Audit logging for security-relevant events

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export auth types
pub use auth::{
    optional_jwt_auth_middleware, AccessPolicy, AuthUser, JwtAuth, JwtClaims, JwtConfig,
    StaticPolicy, ACCESS_TOKEN_TTL,
};

// Re-export server types
pub use server::{
    create_production_app, create_router, health_router, run_health_checks, HealthCheckFuture,
    HealthResponse, ShutdownCoordinator,
};

// Re-export HTTP middleware
pub use http::security_headers;

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{CurrentUser, ValidatedJson};

// Re-export audit types
pub use audit::{extract_ip_from_headers, extract_user_agent, AuditEvent, AuditOutcome};
