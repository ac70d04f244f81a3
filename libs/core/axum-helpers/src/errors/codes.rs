//! Type-safe error codes for API responses.
//!
//! Each code has a client-facing string, an integer for logs and metrics,
//! and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// A required field is missing or malformed
    ValidationError,

    /// Invalid UUID format in path
    InvalidUuid,

    /// Request body could not be read (bad JSON, bad multipart)
    InvalidRequestBody,

    /// Requested resource was not found
    NotFound,

    /// Upload exceeds the accepted size
    PayloadTooLarge,

    /// No route for this method
    MethodNotAllowed,

    // Server errors (1500s)
    InternalError,

    // Database errors (2000-2999)
    /// The store rejected or failed an operation
    DatabaseError,

    /// The store could not be reached
    DatabaseUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidRequestBody => "INVALID_REQUEST_BODY",
            Self::NotFound => "NOT_FOUND",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
        }
    }

    /// Integer code for structured logs.
    ///
    /// - 1000-1499: client errors
    /// - 1500-1999: server errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::InvalidRequestBody => 1003,
            Self::NotFound => 1004,
            Self::PayloadTooLarge => 1005,
            Self::MethodNotAllowed => 1006,
            Self::InternalError => 1500,
            Self::DatabaseError => 2001,
            Self::DatabaseUnavailable => 2002,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::InvalidRequestBody => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::PayloadTooLarge => "Payload too large",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseUnavailable => "Database is temporarily unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
