//! HTTP API for the HCM assistant.
//!
//! This module provides the REST endpoints for authentication, the chat
//! assistant, and CRUD access to employees, attendance, leave, salary,
//! settings and feedback.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ChatRequest, ClockInRequest, ClockOutRequest, FeedbackRequest, LoginRequest, MIN_PASSWORD_LEN,
    PayslipRequest, SignupRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, AuthResponse, ChatResponse, EmployeeWithDepartment, FeedbackSaved,
    MessageResponse, Payslip, SalaryExport,
};
pub use state::AppState;
