//! Response types for the HCM API.
//!
//! This module defines the error body, the mapping from [`HcmError`] onto
//! HTTP statuses, and the response bodies that are not plain models.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::Intent;
use crate::error::HcmError;
use crate::models::{Department, Employee, Feedback, SalaryComponent, User};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<HcmError> for ApiErrorResponse {
    fn from(error: HcmError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            HcmError::ConfigNotFound { .. } | HcmError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            HcmError::InvalidEmployee { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_EMPLOYEE",
                    message,
                    format!("The '{}' field failed validation", field),
                ),
            ),
            HcmError::InvalidLeaveRequest { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_LEAVE_REQUEST", message),
            ),
            HcmError::InvalidRequest { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::validation_error(message))
            }
            HcmError::NotFound { .. } => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message)),
            HcmError::Conflict { .. } => (StatusCode::CONFLICT, ApiError::new("CONFLICT", message)),
            HcmError::Unauthorized { .. } => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", message))
            }
            HcmError::Store { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORE_ERROR", "Entity store failure", message),
            ),
            HcmError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("INTERNAL_ERROR", "Internal server error", message),
            ),
            HcmError::Upstream { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("UPSTREAM_ERROR", "Language model request failed", message),
            ),
        };
        Self { status, error }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub response: String,
    /// The message that was answered.
    pub message: String,
    /// How the message was routed.
    pub intent: Intent,
    /// Steps taken, only when verbose output was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_steps: Option<Vec<String>>,
}

/// An employee row in `GET /api/employees`, with its department inlined.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeWithDepartment {
    /// The employee fields.
    #[serde(flatten)]
    pub employee: Employee,
    /// The employee's department, if any.
    pub department: Option<Department>,
}

/// Body returned by signup and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Bearer token for later requests.
    pub token: String,
    /// The signed-in account.
    pub user: User,
}

/// Body of `GET /api/salary/export`.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryExport {
    /// Identifier of this export.
    pub export_id: Uuid,
    /// Month exported, as `YYYY-MM`.
    pub period: String,
    /// Every salary component.
    pub data: Vec<SalaryComponent>,
}

/// Body of `POST /api/salary/payslip`.
#[derive(Debug, Clone, Serialize)]
pub struct Payslip {
    /// The paid employee.
    pub employee: Employee,
    /// Their salary components.
    pub salaries: Vec<SalaryComponent>,
    /// Month of the payslip, as `YYYY-MM`.
    pub period: String,
}

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSaved {
    /// Confirmation text.
    pub message: String,
    /// The stored feedback.
    pub feedback: Feedback,
}

/// A confirmation with no other payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Confirmation text.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_error_statuses() {
        let cases = [
            (HcmError::not_found("Employee", 9), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                HcmError::Conflict {
                    message: "open session".to_string(),
                },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                HcmError::Unauthorized {
                    message: "no token".to_string(),
                },
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
            (
                HcmError::InvalidEmployee {
                    field: "manager_id".to_string(),
                    message: "an employee cannot manage themselves".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "INVALID_EMPLOYEE",
            ),
            (
                HcmError::upstream("model returned no choices"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
            ),
        ];
        for (error, status, code) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_internal_faults_are_500() {
        let response: ApiErrorResponse = HcmError::Internal {
            message: "failed to issue token".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "INTERNAL_ERROR");
    }

    #[test]
    fn test_upstream_detail_is_attached() {
        let response: ApiErrorResponse = HcmError::upstream("status 502: bad gateway").into();
        assert_eq!(
            response.error.details.as_deref(),
            Some("Language model error: status 502: bad gateway")
        );
    }

    #[test]
    fn test_chat_response_omits_steps_unless_verbose() {
        let response = ChatResponse {
            response: "Hi".to_string(),
            message: "hello".to_string(),
            intent: Intent::General,
            verbose_steps: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["intent"], "general");
        assert!(json.get("verbose_steps").is_none());
    }
}
