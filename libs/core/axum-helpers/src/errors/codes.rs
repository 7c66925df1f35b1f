//! Type-safe error codes for API responses.
//!
//! Single source of truth for error codes used across the application.
//! Each error code carries:
//! - a string representation for client consumption (e.g. "VALIDATION_ERROR")
//! - an integer code for logging and monitoring (e.g. 1001)
//! - a default human-readable message

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid JSON format in request body
    InvalidJson,

    /// Requested resource was not found
    NotFound,

    /// Authentication credentials are missing or invalid
    Unauthorized,

    /// Authenticated user lacks sufficient permissions
    Forbidden,

    /// Request conflicts with current resource state
    Conflict,

    // Server errors (1500s)
    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Database errors (2000s)
    /// Database connection or query error
    DatabaseError,

    // Notification errors (3000s)
    /// Notification delivery failed
    NotificationError,
}

impl ErrorCode {
    /// String representation for client consumption
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotificationError => "NOTIFICATION_ERROR",
        }
    }

    /// Integer code for structured logs and metrics.
    ///
    /// Ranges:
    /// - 1000-1999: client errors and generic server errors
    /// - 2000-2999: database errors
    /// - 3000-3999: notification errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1002,
            Self::NotFound => 1003,
            Self::Unauthorized => 1004,
            Self::Forbidden => 1005,
            Self::Conflict => 1006,
            Self::InternalError => 1500,
            Self::ServiceUnavailable => 1503,
            Self::DatabaseError => 2001,
            Self::NotificationError => 3001,
        }
    }

    /// Default human-readable message
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidJson => "Invalid JSON in request body",
            Self::NotFound => "Requested resource was not found",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access forbidden",
            Self::Conflict => "Request conflicts with current resource state",
            Self::InternalError => "An unexpected error occurred",
            Self::ServiceUnavailable => "Service temporarily unavailable",
            Self::DatabaseError => "A database error occurred",
            Self::NotificationError => "Notification delivery failed",
        }
    }
}
