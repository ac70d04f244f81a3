use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ProductField;

/// Why a single form field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Missing,
    Invalid(String),
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationReason::Missing => f.write_str("is required"),
            ValidationReason::Invalid(why) => write!(f, "is invalid: {}", why),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{field} {reason}")]
    ValidationFailed {
        field: ProductField,
        reason: ValidationReason,
    },

    #[error("photo must be at most {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Product {0} not found")]
    NotFound(Uuid),

    #[error("Product {0} has no photo")]
    PhotoNotFound(Uuid),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProductError {
    pub fn missing(field: ProductField) -> Self {
        ProductError::ValidationFailed {
            field,
            reason: ValidationReason::Missing,
        }
    }

    pub fn invalid(field: ProductField, why: impl Into<String>) -> Self {
        ProductError::ValidationFailed {
            field,
            reason: ValidationReason::Invalid(why.into()),
        }
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::ValidationFailed { field, reason } => AppError::InvalidField {
                field: field.to_string(),
                message: format!("{} {}", field, reason),
            },
            ProductError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ProductError::MalformedRequest(msg) => AppError::BadRequest(msg),
            ProductError::NotFound(_) | ProductError::PhotoNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ProductError::StoreUnavailable(msg) => AppError::ServiceUnavailable(msg),
            ProductError::Database(msg) => AppError::Database(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. } => {
                ProductError::StoreUnavailable(err.to_string())
            }
            _ => ProductError::Database(err.to_string()),
        }
    }
}

impl From<mongodb::bson::de::Error> for ProductError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        ProductError::Internal(format!("failed to decode product document: {}", err))
    }
}

impl From<mongodb::bson::ser::Error> for ProductError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ProductError::Internal(format!("failed to encode product document: {}", err))
    }
}

impl From<MultipartError> for ProductError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ProductError::PayloadTooLarge {
                limit: crate::models::MAX_PHOTO_BYTES,
            }
        } else {
            ProductError::MalformedRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ProductError {
    fn from(rejection: MultipartRejection) -> Self {
        ProductError::MalformedRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ProductError {
    fn from(rejection: JsonRejection) -> Self {
        ProductError::MalformedRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ProductError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let why = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| errors.to_string());
        ProductError::invalid(ProductField::PriceRange, why)
    }
}
