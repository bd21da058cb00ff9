//! Entity store for HR records.
//!
//! The [`EntityStore`] trait is the persistence seam: handlers and the chat
//! engine only ever read and write through it. [`MemoryStore`] is the
//! bundled implementation.
//!
//! Implementations must enforce the write-time invariants themselves, since
//! concurrent API callers may race on the same records:
//! - at most one open attendance session per employee per day;
//! - no employee may manage themselves or sit in a reporting cycle;
//! - leave requests end on or after the day they start;
//! - user names and e-mail addresses are unique.

mod memory;
mod seed;

use async_trait::async_trait;

use crate::error::HcmResult;
use crate::models::{
    Attendance, AttendanceFilter, Department, Employee, EmployeeDetails, EmployeeUpdate, Feedback,
    LeaveFilter, LeaveRequest, NewAttendance, NewEmployee, NewFeedback, NewLeaveRequest, NewUser,
    SalaryComponent, Setting, User,
};

pub use memory::MemoryStore;
pub use seed::{SeedSummary, seed_demo_data};

/// Employee query. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    /// Only members of this department.
    pub department_id: Option<u64>,
    /// Only direct reports of this manager.
    pub manager_id: Option<u64>,
}

impl EmployeeFilter {
    /// Direct reports of `manager_id`.
    pub fn reports_of(manager_id: u64) -> Self {
        Self {
            manager_id: Some(manager_id),
            ..Self::default()
        }
    }

    /// Members of `department_id`.
    pub fn in_department(department_id: u64) -> Self {
        Self {
            department_id: Some(department_id),
            ..Self::default()
        }
    }

    /// Returns true if `employee` passes the filter.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.department_id
            .is_none_or(|id| employee.department_id == Some(id))
            && self
                .manager_id
                .is_none_or(|id| employee.manager_id == Some(id))
    }
}

/// Read/write access to every HR entity.
///
/// All list operations return records in store iteration order (ascending
/// id) unless documented otherwise. Soft-deleted employees are never
/// returned.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Employees matching `filter`.
    async fn employees(&self, filter: &EmployeeFilter) -> HcmResult<Vec<Employee>>;

    /// One employee, or `None`.
    async fn employee(&self, id: u64) -> HcmResult<Option<Employee>>;

    /// The employee linked to a login account, or `None`.
    async fn employee_for_user(&self, user_id: u64) -> HcmResult<Option<Employee>>;

    /// One employee with department, manager and reports preloaded.
    async fn employee_details(&self, id: u64) -> HcmResult<Option<EmployeeDetails>>;

    /// Creates an employee after validating the reporting line.
    async fn create_employee(&self, input: NewEmployee) -> HcmResult<Employee>;

    /// Applies a partial edit after validating the reporting line.
    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> HcmResult<Employee>;

    /// Soft-deletes an employee.
    async fn delete_employee(&self, id: u64) -> HcmResult<()>;

    /// All departments.
    async fn departments(&self) -> HcmResult<Vec<Department>>;

    /// One department, or `None`.
    async fn department(&self, id: u64) -> HcmResult<Option<Department>>;

    /// Attendance records matching `filter`.
    async fn attendance(&self, filter: &AttendanceFilter) -> HcmResult<Vec<Attendance>>;

    /// Opens a session; `Conflict` if the employee already has an open
    /// session on that day.
    async fn create_attendance(&self, input: NewAttendance) -> HcmResult<Attendance>;

    /// Overwrites an existing attendance record.
    async fn save_attendance(&self, record: Attendance) -> HcmResult<()>;

    /// Leave requests matching `filter`.
    async fn leave_requests(&self, filter: &LeaveFilter) -> HcmResult<Vec<LeaveRequest>>;

    /// Files a pending leave request.
    async fn create_leave_request(&self, input: NewLeaveRequest) -> HcmResult<LeaveRequest>;

    /// Salary components, optionally for one employee.
    async fn salary_components(&self, employee_id: Option<u64>) -> HcmResult<Vec<SalaryComponent>>;

    /// All settings, in insertion order.
    async fn settings(&self) -> HcmResult<Vec<Setting>>;

    /// One setting by key, or `None`.
    async fn setting(&self, key: &str) -> HcmResult<Option<Setting>>;

    /// Creates or replaces a setting.
    async fn upsert_setting(&self, setting: Setting) -> HcmResult<Setting>;

    /// Removes a setting; removing a missing key is not an error.
    async fn delete_setting(&self, key: &str) -> HcmResult<()>;

    /// Records chat feedback.
    async fn create_feedback(&self, input: NewFeedback) -> HcmResult<Feedback>;

    /// All feedback, newest first.
    async fn feedback(&self) -> HcmResult<Vec<Feedback>>;

    /// One user, or `None`.
    async fn user(&self, id: u64) -> HcmResult<Option<User>>;

    /// The user with this login name, or `None`.
    async fn user_by_username(&self, username: &str) -> HcmResult<Option<User>>;

    /// Creates a user; `Conflict` on a duplicate name or e-mail.
    async fn create_user(&self, input: NewUser) -> HcmResult<User>;
}
