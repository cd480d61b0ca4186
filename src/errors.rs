use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::attribute_validator::ValidationFailure;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "code": "incomplete_attributes",
    "message": "Missing required attributes: Size, Color",
    "fields": ["Size", "Color"],
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    #[schema(example = "Bad Request")]
    pub error: String,
    /// Machine-readable error kind
    #[schema(example = "validation_failed")]
    pub code: String,
    /// Human-readable error description
    pub message: String,
    /// Offending attribute or field names, when the error concerns specific ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    /// The entity the operation targets does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity referenced by the request (parent, category, attribute,
    /// option, product) does not exist
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    /// A structural invariant would be violated
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A definition's own constraint fields contradict each other
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationFailure),

    /// Activation attempted while required attributes have no value
    #[error("Missing required attributes: {}", .0.join(", "))]
    IncompleteAttributes(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<ValidationFailure> for ServiceError {
    fn from(failure: ValidationFailure) -> Self {
        ServiceError::ValidationFailed(failure)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl ServiceError {
    /// Convenience constructor for wrapping string-based database errors.
    pub fn database_error_message(message: impl Into<String>) -> Self {
        ServiceError::DatabaseError(DbErr::Custom(message.into()))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ReferenceNotFound(_)
            | Self::InvalidOperation(_)
            | Self::InvalidConstraint(_)
            | Self::ValidationFailed(_)
            | Self::IncompleteAttributes(_)
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable snake_case name of the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "database_error",
            Self::NotFound(_) => "not_found",
            Self::ReferenceNotFound(_) => "reference_not_found",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::InvalidConstraint(_) => "invalid_constraint",
            Self::ValidationFailed(_) => "validation_failed",
            Self::IncompleteAttributes(_) => "incomplete_attributes",
            Self::Conflict(_) => "conflict",
            Self::InvalidInput(_) => "invalid_input",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Attribute names the error is about, if any
    pub fn fields(&self) -> Option<Vec<String>> {
        match self {
            Self::ValidationFailed(failure) => Some(vec![failure.attribute.clone()]),
            Self::IncompleteAttributes(missing) => Some(missing.clone()),
            _ => None,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        let status = self.status_code();
        ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            code: self.code().to_string(),
            message: self.response_message(),
            fields: self.fields(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if matches!(self, Self::DatabaseError(_) | Self::InternalError(_)) {
            tracing::error!(error = %self, "request failed");
        }
        let status = self.status_code();
        (status, Json(self.to_error_response())).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::ServiceError(service_error) => return service_error.into_response(),
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_input".to_string(), msg)
            }
        };

        let error_response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            code,
            message,
            fields: None,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(error_response)).into_response()
    }
}
