//! HTTP request handlers for the HCM API.
//!
//! This module contains the router and the handler functions for all API
//! endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser, hash_password, verify_password};
use crate::chat::ChatInput;
use crate::error::HcmError;
use crate::models::{
    AttendanceFilter, EmployeeUpdate, LeaveFilter, NewAttendance, NewEmployee, NewLeaveRequest,
    NewUser, Setting,
};
use crate::store::EmployeeFilter;

use super::request::{
    ChatRequest, ClockInRequest, ClockOutRequest, FeedbackRequest, LoginRequest, PayslipRequest,
    SignupRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, AuthResponse, ChatResponse, EmployeeWithDepartment, FeedbackSaved,
    MessageResponse, Payslip, SalaryExport,
};
use super::state::AppState;

type ApiResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/me", get(me_handler))
        .route("/api/chat", post(chat_handler))
        .route(
            "/api/employees",
            get(list_employees_handler).post(create_employee_handler),
        )
        .route(
            "/api/employees/:id",
            get(get_employee_handler)
                .put(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .route("/api/departments", get(list_departments_handler))
        .route("/api/attendance", get(list_attendance_handler))
        .route("/api/attendance/clockin", post(clock_in_handler))
        .route("/api/attendance/clockout", post(clock_out_handler))
        .route(
            "/api/leave",
            get(list_leave_handler).post(create_leave_handler),
        )
        .route("/api/salary/export", get(salary_export_handler))
        .route("/api/salary/payslip", post(payslip_handler))
        .route(
            "/api/settings",
            get(list_settings_handler).post(upsert_setting_handler),
        )
        .route(
            "/api/settings/:key",
            get(get_setting_handler).delete(delete_setting_handler),
        )
        .route(
            "/api/feedback",
            get(list_feedback_handler).post(create_feedback_handler),
        )
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Unwraps a JSON body, turning axum's rejection into a 400 with the
/// parser's message.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

/// Handler for POST /api/chat.
///
/// Anonymous callers are allowed; the engine decides whether the routed
/// intent needs an identity.
async fn chat_handler(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    let caller_id = caller.map(|c| c.user_id);
    info!(
        correlation_id = %correlation_id,
        authenticated = caller_id.is_some(),
        "Processing chat request"
    );

    let input: ChatInput = json_body(payload, correlation_id)?.into();
    let start_time = Instant::now();
    match state.chat().respond(caller_id, &input).await {
        Ok(reply) => {
            info!(
                correlation_id = %correlation_id,
                intent = %reply.intent,
                steps = reply.steps.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Chat request completed"
            );
            let verbose_steps = input.verbose.then_some(reply.steps);
            Ok(json_response(
                StatusCode::OK,
                ChatResponse {
                    response: reply.text,
                    message: input.message,
                    intent: reply.intent,
                    verbose_steps,
                },
            ))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                duration_us = start_time.elapsed().as_micros(),
                "Chat request failed"
            );
            Err(err.into())
        }
    }
}

async fn signup_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    request.validate()?;

    let user = state
        .store()
        .create_user(NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password)?,
        })
        .await?;
    let token = state.jwt().issue(user.id)?;
    info!(correlation_id = %correlation_id, user_id = user.id, "User signed up");
    Ok(json_response(StatusCode::CREATED, AuthResponse { token, user }))
}

async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let invalid = || HcmError::Unauthorized {
        message: "Invalid credentials".to_string(),
    };

    let user = state
        .store()
        .user_by_username(&request.username)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&request.password, &user.password_hash) {
        warn!(correlation_id = %correlation_id, user_id = user.id, "Password rejected");
        return Err(invalid().into());
    }
    let token = state.jwt().issue(user.id)?;
    info!(correlation_id = %correlation_id, user_id = user.id, "User logged in");
    Ok(json_response(StatusCode::OK, AuthResponse { token, user }))
}

async fn me_handler(State(state): State<AppState>, caller: AuthUser) -> ApiResult {
    let user = state
        .store()
        .user(caller.user_id)
        .await?
        .ok_or_else(|| HcmError::not_found("User", caller.user_id))?;
    Ok(json_response(StatusCode::OK, user))
}

async fn list_employees_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    let store = state.store();
    let departments = store.departments().await?;
    let employees: Vec<EmployeeWithDepartment> = store
        .employees(&EmployeeFilter::default())
        .await?
        .into_iter()
        .map(|employee| {
            let department = employee
                .department_id
                .and_then(|id| departments.iter().find(|d| d.id == id))
                .cloned();
            EmployeeWithDepartment {
                employee,
                department,
            }
        })
        .collect();
    Ok(json_response(StatusCode::OK, employees))
}

async fn get_employee_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    let details = state
        .store()
        .employee_details(id)
        .await?
        .ok_or_else(|| HcmError::not_found("Employee", id))?;
    Ok(json_response(StatusCode::OK, details))
}

async fn create_employee_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let employee = state.store().create_employee(input).await.map_err(|err| {
        warn!(correlation_id = %correlation_id, error = %err, "Employee rejected");
        err
    })?;
    info!(correlation_id = %correlation_id, employee_id = employee.id, "Employee created");
    Ok(json_response(StatusCode::CREATED, employee))
}

async fn update_employee_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<u64>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let update = json_body(payload, correlation_id)?;
    let employee = state.store().update_employee(id, update).await.map_err(|err| {
        warn!(correlation_id = %correlation_id, employee_id = id, error = %err, "Employee update rejected");
        err
    })?;
    Ok(json_response(StatusCode::OK, employee))
}

async fn delete_employee_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<u64>,
) -> ApiResult {
    state.store().delete_employee(id).await?;
    info!(employee_id = id, "Employee deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_departments_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    Ok(json_response(StatusCode::OK, state.store().departments().await?))
}

async fn list_attendance_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    let mut records = state.store().attendance(&AttendanceFilter::default()).await?;
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.clock_in.cmp(&a.clock_in)));
    Ok(json_response(StatusCode::OK, records))
}

async fn clock_in_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<ClockInRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let now = state.clock().now();
    let record = state
        .store()
        .create_attendance(NewAttendance {
            employee_id: request.employee_id,
            date: now.date_naive(),
            clock_in: now,
            location: request.location,
        })
        .await?;
    Ok(json_response(StatusCode::CREATED, record))
}

async fn clock_out_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<ClockOutRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let now = state.clock().now();
    let open = AttendanceFilter::for_employee_on(request.employee_id, now.date_naive()).open();
    let mut record = state
        .store()
        .attendance(&open)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| HcmError::not_found("Open attendance session for employee", request.employee_id))?;
    record.clock_out = Some(now);
    state.store().save_attendance(record.clone()).await?;
    Ok(json_response(StatusCode::OK, record))
}

async fn list_leave_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    let mut requests = state.store().leave_requests(&LeaveFilter::default()).await?;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(json_response(StatusCode::OK, requests))
}

async fn create_leave_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<NewLeaveRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let request = state.store().create_leave_request(input).await?;
    info!(correlation_id = %correlation_id, leave_id = request.id, "Leave request filed");
    Ok(json_response(StatusCode::CREATED, request))
}

async fn salary_export_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    let data = state.store().salary_components(None).await?;
    let export = SalaryExport {
        export_id: Uuid::new_v4(),
        period: state.clock().now().format("%Y-%m").to_string(),
        data,
    };
    info!(export_id = %export.export_id, components = export.data.len(), "Salary export generated");
    Ok(json_response(StatusCode::OK, export))
}

async fn payslip_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<PayslipRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let employee = state
        .store()
        .employee(request.employee_id)
        .await?
        .ok_or_else(|| HcmError::not_found("Employee", request.employee_id))?;
    let salaries = state.store().salary_components(Some(employee.id)).await?;
    Ok(json_response(
        StatusCode::OK,
        Payslip {
            employee,
            salaries,
            period: state.clock().now().format("%Y-%m").to_string(),
        },
    ))
}

async fn list_settings_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    Ok(json_response(StatusCode::OK, state.store().settings().await?))
}

async fn get_setting_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(key): Path<String>,
) -> ApiResult {
    let setting = state
        .store()
        .setting(&key)
        .await?
        .ok_or_else(|| HcmError::not_found("Setting", &key))?;
    Ok(json_response(StatusCode::OK, setting))
}

async fn upsert_setting_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<Setting>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let setting = json_body(payload, correlation_id)?;
    if setting.key.trim().is_empty() {
        return Err(ApiErrorResponse::bad_request(ApiError::validation_error(
            "key must not be empty",
        )));
    }
    let setting = state.store().upsert_setting(setting).await?;
    info!(correlation_id = %correlation_id, key = %setting.key, "Setting saved");
    Ok(json_response(StatusCode::OK, setting))
}

async fn delete_setting_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(key): Path<String>,
) -> ApiResult {
    state.store().delete_setting(&key).await?;
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            message: "Setting deleted successfully".to_string(),
        },
    ))
}

async fn create_feedback_handler(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let feedback = state
        .store()
        .create_feedback(request.into_new_feedback(caller.map(|c| c.user_id)))
        .await?;
    info!(correlation_id = %correlation_id, feedback_id = feedback.id, rating = %feedback.rating, "Feedback saved");
    Ok(json_response(
        StatusCode::OK,
        FeedbackSaved {
            message: "Feedback saved successfully".to_string(),
            feedback,
        },
    ))
}

async fn list_feedback_handler(State(state): State<AppState>, _caller: AuthUser) -> ApiResult {
    Ok(json_response(StatusCode::OK, state.store().feedback().await?))
}
