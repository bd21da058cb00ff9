//! In-memory entity store.
//!
//! Tables are `BTreeMap`s keyed by id so iteration order is id order. A
//! single `RwLock` guards all tables; every invariant check happens under
//! the write lock together with the write it protects.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{HcmError, HcmResult};
use crate::models::{
    Attendance, AttendanceFilter, Department, Employee, EmployeeDetails, EmployeeUpdate, Feedback,
    LeaveFilter, LeaveRequest, LeaveStatus, NewAttendance, NewEmployee, NewFeedback,
    NewLeaveRequest, NewUser, SalaryComponent, Setting, User, check_reporting_line,
};

use super::{EmployeeFilter, EntityStore};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    departments: BTreeMap<u64, Department>,
    employees: BTreeMap<u64, Employee>,
    attendance: BTreeMap<u64, Attendance>,
    leave_requests: BTreeMap<u64, LeaveRequest>,
    salary_components: BTreeMap<u64, SalaryComponent>,
    settings: Vec<Setting>,
    feedback: BTreeMap<u64, Feedback>,
}

impl Tables {
    fn visible_employee(&self, id: u64) -> Option<&Employee> {
        self.employees.get(&id).filter(|e| e.is_visible())
    }

    fn check_manager(&self, employee_id: u64, manager_id: Option<u64>) -> HcmResult<()> {
        check_reporting_line(employee_id, manager_id, |id| {
            self.visible_employee(id).map(|e| e.manager_id)
        })
    }

    fn check_department(&self, department_id: Option<u64>) -> HcmResult<()> {
        match department_id {
            Some(id) if !self.departments.contains_key(&id) => Err(HcmError::InvalidEmployee {
                field: "department_id".to_string(),
                message: format!("department {} does not exist", id),
            }),
            _ => Ok(()),
        }
    }

    fn check_unique_email(&self, employee_id: u64, email: &str) -> HcmResult<()> {
        let taken = self.employees.values().any(|e| {
            e.is_visible() && e.id != employee_id && e.email.eq_ignore_ascii_case(email)
        });
        if taken {
            return Err(HcmError::Conflict {
                message: format!("an employee with e-mail '{}' already exists", email),
            });
        }
        Ok(())
    }
}

fn next_id<T>(table: &BTreeMap<u64, T>) -> u64 {
    table.keys().next_back().map_or(1, |last| last + 1)
}

/// An [`EntityStore`] held entirely in process memory.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store whose `created_at`/`updated_at` stamps come
    /// from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock,
        }
    }

    /// Adds a department.
    pub async fn insert_department(&self, name: &str, parent_id: Option<u64>) -> Department {
        let mut tables = self.tables.write().await;
        let department = Department {
            id: next_id(&tables.departments),
            name: name.to_string(),
            parent_id,
        };
        tables.departments.insert(department.id, department.clone());
        department
    }

    /// Adds a salary component for an existing employee.
    pub async fn insert_salary_component(
        &self,
        employee_id: u64,
        component_type: &str,
        amount: Decimal,
        frequency: Option<&str>,
        effective_date: NaiveDate,
    ) -> HcmResult<SalaryComponent> {
        let mut tables = self.tables.write().await;
        if tables.visible_employee(employee_id).is_none() {
            return Err(HcmError::not_found("Employee", employee_id));
        }
        let component = SalaryComponent {
            id: next_id(&tables.salary_components),
            employee_id,
            component_type: component_type.to_string(),
            amount,
            currency: None,
            frequency: frequency.map(str::to_string),
            effective_date,
        };
        tables
            .salary_components
            .insert(component.id, component.clone());
        Ok(component)
    }

    /// Records an approval decision on a leave request.
    pub async fn set_leave_status(&self, id: u64, status: LeaveStatus) -> HcmResult<LeaveRequest> {
        let mut tables = self.tables.write().await;
        let request = tables
            .leave_requests
            .get_mut(&id)
            .ok_or_else(|| HcmError::not_found("Leave request", id))?;
        request.status = status;
        Ok(request.clone())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn employees(&self, filter: &EmployeeFilter) -> HcmResult<Vec<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|e| e.is_visible() && filter.matches(e))
            .cloned()
            .collect())
    }

    async fn employee(&self, id: u64) -> HcmResult<Option<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables.visible_employee(id).cloned())
    }

    async fn employee_for_user(&self, user_id: u64) -> HcmResult<Option<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .find(|e| e.is_visible() && e.user_id == Some(user_id))
            .cloned())
    }

    async fn employee_details(&self, id: u64) -> HcmResult<Option<EmployeeDetails>> {
        let tables = self.tables.read().await;
        let Some(employee) = tables.visible_employee(id) else {
            return Ok(None);
        };
        let department = employee
            .department_id
            .and_then(|d| tables.departments.get(&d))
            .cloned();
        let manager = employee
            .manager_id
            .and_then(|m| tables.visible_employee(m))
            .cloned();
        let reports = tables
            .employees
            .values()
            .filter(|e| e.is_visible() && e.manager_id == Some(id))
            .cloned()
            .collect();
        Ok(Some(EmployeeDetails {
            employee: employee.clone(),
            department,
            manager,
            reports,
        }))
    }

    async fn create_employee(&self, input: NewEmployee) -> HcmResult<Employee> {
        input.validate()?;
        let mut tables = self.tables.write().await;
        let id = next_id(&tables.employees);
        tables.check_manager(id, input.manager_id)?;
        tables.check_department(input.department_id)?;
        tables.check_unique_email(id, &input.email)?;

        let now = self.clock.now();
        let employee = Employee {
            id,
            user_id: input.user_id,
            name: input.name,
            email: input.email,
            job_title: input.job_title,
            department_id: input.department_id,
            manager_id: input.manager_id,
            hire_date: input.hire_date,
            employment_type: input.employment_type,
            status: input.status,
            location: input.location,
            work_arrangement: input.work_arrangement,
            base_salary: input.base_salary,
            currency: input.currency,
            pay_frequency: input.pay_frequency,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.employees.insert(id, employee.clone());
        debug!(employee_id = id, "Employee created");
        Ok(employee)
    }

    async fn update_employee(&self, id: u64, update: EmployeeUpdate) -> HcmResult<Employee> {
        let mut tables = self.tables.write().await;
        let current = tables
            .visible_employee(id)
            .ok_or_else(|| HcmError::not_found("Employee", id))?;
        let mut updated = update.apply_to(current)?;
        tables.check_manager(id, updated.manager_id)?;
        tables.check_department(updated.department_id)?;
        tables.check_unique_email(id, &updated.email)?;

        updated.updated_at = self.clock.now();
        tables.employees.insert(id, updated.clone());
        debug!(employee_id = id, "Employee updated");
        Ok(updated)
    }

    async fn delete_employee(&self, id: u64) -> HcmResult<()> {
        let mut tables = self.tables.write().await;
        let now = self.clock.now();
        let employee = tables
            .employees
            .get_mut(&id)
            .filter(|e| e.is_visible())
            .ok_or_else(|| HcmError::not_found("Employee", id))?;
        employee.deleted_at = Some(now);
        debug!(employee_id = id, "Employee soft-deleted");
        Ok(())
    }

    async fn departments(&self) -> HcmResult<Vec<Department>> {
        let tables = self.tables.read().await;
        Ok(tables.departments.values().cloned().collect())
    }

    async fn department(&self, id: u64) -> HcmResult<Option<Department>> {
        let tables = self.tables.read().await;
        Ok(tables.departments.get(&id).cloned())
    }

    async fn attendance(&self, filter: &AttendanceFilter) -> HcmResult<Vec<Attendance>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn create_attendance(&self, input: NewAttendance) -> HcmResult<Attendance> {
        let mut tables = self.tables.write().await;
        if tables.visible_employee(input.employee_id).is_none() {
            return Err(HcmError::not_found("Employee", input.employee_id));
        }
        let open = AttendanceFilter::for_employee_on(input.employee_id, input.date).open();
        if tables.attendance.values().any(|r| open.matches(r)) {
            return Err(HcmError::Conflict {
                message: format!(
                    "employee {} already has an open attendance session on {}",
                    input.employee_id, input.date
                ),
            });
        }

        let record = Attendance {
            id: next_id(&tables.attendance),
            employee_id: input.employee_id,
            date: input.date,
            clock_in: input.clock_in,
            clock_out: None,
            location: input.location,
        };
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save_attendance(&self, record: Attendance) -> HcmResult<()> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .attendance
            .get_mut(&record.id)
            .ok_or_else(|| HcmError::not_found("Attendance", record.id))?;
        *slot = record;
        Ok(())
    }

    async fn leave_requests(&self, filter: &LeaveFilter) -> HcmResult<Vec<LeaveRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leave_requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn create_leave_request(&self, input: NewLeaveRequest) -> HcmResult<LeaveRequest> {
        input.validate()?;
        let mut tables = self.tables.write().await;
        if tables.visible_employee(input.employee_id).is_none() {
            return Err(HcmError::not_found("Employee", input.employee_id));
        }
        let request = LeaveRequest {
            id: next_id(&tables.leave_requests),
            employee_id: input.employee_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            status: LeaveStatus::Pending,
            created_at: self.clock.now(),
        };
        tables.leave_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn salary_components(&self, employee_id: Option<u64>) -> HcmResult<Vec<SalaryComponent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .salary_components
            .values()
            .filter(|c| employee_id.is_none_or(|id| c.employee_id == id))
            .cloned()
            .collect())
    }

    async fn settings(&self) -> HcmResult<Vec<Setting>> {
        let tables = self.tables.read().await;
        Ok(tables.settings.clone())
    }

    async fn setting(&self, key: &str) -> HcmResult<Option<Setting>> {
        let tables = self.tables.read().await;
        Ok(tables.settings.iter().find(|s| s.key == key).cloned())
    }

    async fn upsert_setting(&self, setting: Setting) -> HcmResult<Setting> {
        let mut tables = self.tables.write().await;
        match tables.settings.iter_mut().find(|s| s.key == setting.key) {
            Some(existing) => *existing = setting.clone(),
            None => tables.settings.push(setting.clone()),
        }
        Ok(setting)
    }

    async fn delete_setting(&self, key: &str) -> HcmResult<()> {
        let mut tables = self.tables.write().await;
        tables.settings.retain(|s| s.key != key);
        Ok(())
    }

    async fn create_feedback(&self, input: NewFeedback) -> HcmResult<Feedback> {
        let mut tables = self.tables.write().await;
        let feedback = Feedback {
            id: next_id(&tables.feedback),
            user_id: input.user_id,
            question: input.question,
            response: input.response,
            rating: input.rating,
            comment: input.comment,
            created_at: self.clock.now(),
        };
        tables.feedback.insert(feedback.id, feedback.clone());
        Ok(feedback)
    }

    async fn feedback(&self) -> HcmResult<Vec<Feedback>> {
        let tables = self.tables.read().await;
        Ok(tables.feedback.values().rev().cloned().collect())
    }

    async fn user(&self, id: u64) -> HcmResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> HcmResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, input: NewUser) -> HcmResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == input.username) {
            return Err(HcmError::Conflict {
                message: "Username already exists".to_string(),
            });
        }
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(HcmError::Conflict {
                message: "Email already exists".to_string(),
            });
        }
        let user = User {
            id: next_id(&tables.users),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            created_at: self.clock.now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}
