// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::assembler::AssembleError;
use crate::auth::JwtError;
use crate::database::procedure::ProcedureError;
use crate::services::otp_mail::MailError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity (business rule refused by the database)
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "message": self.message(),
            "error": self.error_code()
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<ProcedureError> for ApiError {
    fn from(err: ProcedureError) -> Self {
        match err {
            // Raised on purpose by the procedure, safe to show verbatim
            ProcedureError::BusinessRule { message, .. } => ApiError::unprocessable_entity(message),
            ProcedureError::ContractViolation(e) => e.into(),
            ProcedureError::Server { number, message } => {
                tracing::error!("Procedure error {}: {}", number, message);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ProcedureError::Database(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            ProcedureError::Pool(db_err) => {
                tracing::error!("Database pool error: {}", db_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<AssembleError> for ApiError {
    fn from(err: AssembleError) -> Self {
        tracing::error!("Procedure contract violation: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        tracing::error!("OTP mail error: {}", err);
        ApiError::internal_server_error("Failed to send OTP email")
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        tracing::error!("Token error: {}", err);
        ApiError::internal_server_error("Failed to issue token")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_numbers_map_to_422() {
        let err: ApiError = ProcedureError::from_number(50001, "Project already confirmed").into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.message(), "Project already confirmed");
    }

    #[test]
    fn infrastructure_numbers_map_to_500_with_generic_message() {
        let err: ApiError = ProcedureError::from_number(4060, "Cannot open database \"projects\"").into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.message().contains("projects"));
    }

    #[test]
    fn contract_violation_is_500() {
        let err: ApiError = ProcedureError::from(AssembleError::MissingResultSet {
            expected: 2,
            actual: 1,
        })
        .into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn envelope_shape() {
        let body = ApiError::not_found("Menu not found").to_json();
        assert_eq!(
            body,
            json!({ "success": false, "message": "Menu not found", "error": "NOT_FOUND" })
        );
    }

    #[test]
    fn validation_envelope_carries_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("emailId".to_string(), "This field is required".to_string());
        let body = ApiError::validation_error("Validation failed", Some(fields)).to_json();
        assert_eq!(body["error"], json!("VALIDATION_ERROR"));
        assert_eq!(body["field_errors"]["emailId"], json!("This field is required"));

        let bare = ApiError::validation_error("Invalid project number", None).to_json();
        assert!(bare.get("field_errors").is_none());
    }
}
