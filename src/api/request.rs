//! Request types for the HCM API.
//!
//! Bodies that map one-to-one onto a model input (`NewEmployee`,
//! `EmployeeUpdate`, `NewLeaveRequest`, `Setting`) are deserialized as
//! that model directly. The types here cover everything else.

use serde::{Deserialize, Serialize};

use crate::chat::ChatInput;
use crate::error::{HcmError, HcmResult};
use crate::llm::LlmMessage;
use crate::models::NewFeedback;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub history: Vec<LlmMessage>,
    /// Include the routing steps in the response.
    #[serde(default)]
    pub verbose: bool,
}

impl From<ChatRequest> for ChatInput {
    fn from(request: ChatRequest) -> Self {
        ChatInput {
            message: request.message,
            history: request.history,
            verbose: request.verbose,
        }
    }
}

/// Request body for `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Login name.
    pub username: String,
    /// E-mail address.
    pub email: String,
    /// Plain-text password, at least [`MIN_PASSWORD_LEN`] characters.
    pub password: String,
}

impl SignupRequest {
    /// Checks the fields before anything is hashed or stored.
    pub fn validate(&self) -> HcmResult<()> {
        let invalid = |message: &str| {
            Err(HcmError::InvalidRequest {
                message: message.to_string(),
            })
        };
        if self.username.trim().is_empty() {
            return invalid("username must not be empty");
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return invalid("email must be a valid e-mail address"),
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(HcmError::InvalidRequest {
                message: format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            });
        }
        Ok(())
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Request body for `POST /api/attendance/clockin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockInRequest {
    /// The employee clocking in.
    pub employee_id: u64,
    /// Where they are clocking in from.
    #[serde(default)]
    pub location: Option<String>,
}

/// Request body for `POST /api/attendance/clockout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockOutRequest {
    /// The employee clocking out.
    pub employee_id: u64,
}

/// Request body for `POST /api/salary/payslip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipRequest {
    /// The employee to produce a payslip for.
    pub employee_id: u64,
}

/// Request body for `POST /api/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// The question that was asked.
    pub question: String,
    /// The answer that was given.
    pub response: String,
    /// Rating label.
    pub rating: String,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl FeedbackRequest {
    /// Attaches the rating user, if signed in.
    pub fn into_new_feedback(self, user_id: Option<u64>) -> NewFeedback {
        NewFeedback {
            user_id,
            question: self.question,
            response: self.response,
            rating: self.rating,
            comment: self.comment.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        let input: ChatInput = request.into();
        assert_eq!(input.message, "hi");
        assert!(input.history.is_empty());
        assert!(!input.verbose);
    }

    #[test]
    fn test_chat_request_requires_message() {
        let result: Result<ChatRequest, _> = serde_json::from_str(r#"{"verbose":true}"#);
        assert!(result.unwrap_err().to_string().contains("missing field `message`"));
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup("nina", "nina@company.com", "secret1").validate().is_ok());
        assert!(signup("", "nina@company.com", "secret1").validate().is_err());
        assert!(signup("nina", "nina.company.com", "secret1").validate().is_err());
        assert!(signup("nina", "nina@company.com", "short").validate().is_err());
    }

    #[test]
    fn test_blank_feedback_comment_is_dropped() {
        let request = FeedbackRequest {
            question: "q".to_string(),
            response: "r".to_string(),
            rating: "helpful".to_string(),
            comment: Some("  ".to_string()),
        };
        let feedback = request.into_new_feedback(Some(3));
        assert_eq!(feedback.user_id, Some(3));
        assert_eq!(feedback.comment, None);
    }
}
