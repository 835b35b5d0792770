//! Platform Error Types
//!
//! Categorized failures raised by the core. An outer boundary maps them to
//! whatever response convention the deployment uses; the `IntoResponse`
//! implementation below is that mapping for the bundled axum boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::validation::ValidationFailure;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Validation failed: {}", joined_failures(.failures))]
    Validation { failures: Vec<ValidationFailure> },

    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: String, key: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Duplicate entity: {entity} with {field}={value}")]
    AlreadyExists {
        entity: String,
        field: String,
        value: String,
    },

    #[error("Infrastructure error: {message}")]
    Infrastructure { message: String },

    #[error("Invalid transaction state: cannot {operation} while {state}")]
    TransactionState { operation: String, state: String },
}

/// Join failure messages with a clear delimiter for logs and display.
pub fn joined_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PlatformError {
    pub fn validation(failures: Vec<ValidationFailure>) -> Self {
        Self::Validation { failures }
    }

    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn already_exists(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure {
            message: message.into(),
        }
    }

    pub fn transaction_state(operation: impl Into<String>, state: impl Into<String>) -> Self {
        Self::TransactionState {
            operation: operation.into(),
            state: state.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

impl From<sqlx::Error> for PlatformError {
    fn from(err: sqlx::Error) -> Self {
        Self::Infrastructure {
            message: format!("Database error: {}", err),
        }
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        Self::Infrastructure {
            message: format!("Serialization error: {}", err),
        }
    }
}

/// Error response body
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<Vec<ValidationFailure>>,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            PlatformError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PlatformError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PlatformError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            PlatformError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            PlatformError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            PlatformError::AlreadyExists { .. } => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            PlatformError::Infrastructure { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INFRASTRUCTURE_ERROR")
            }
            PlatformError::TransactionState { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_TRANSACTION_STATE")
            }
        };

        let failures = match &self {
            PlatformError::Validation { failures } => Some(failures.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            failures,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_messages() {
        let err = PlatformError::validation(vec![
            ValidationFailure::new("name", "Name must be at least 3 characters"),
            ValidationFailure::new("code", "Code is required"),
        ]);
        let text = err.to_string();
        assert!(text.contains("name: Name must be at least 3 characters"));
        assert!(text.contains("; code: Code is required"));
    }

    #[test]
    fn test_not_found_display() {
        let err = PlatformError::not_found("Framework", "fw-123");
        assert_eq!(err.to_string(), "Entity not found: Framework with key fw-123");
    }

    #[test]
    fn test_forbidden_distinct_from_unauthorized() {
        let forbidden = PlatformError::forbidden("Missing permission: frameworks:create");
        let unauthorized = PlatformError::unauthorized("No authenticated principal");
        assert!(matches!(forbidden, PlatformError::Forbidden { .. }));
        assert!(matches!(unauthorized, PlatformError::Unauthorized { .. }));
    }
}
