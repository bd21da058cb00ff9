//! Employee and department models.
//!
//! This module defines the Employee struct, its employment enums, the
//! Department struct, and the write-side inputs used to create and edit
//! employees.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{HcmError, HcmResult};

use super::salary::{DEFAULT_CURRENCY, DEFAULT_EMPLOYEE_PAY_FREQUENCY};

/// Represents the type of employment arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time employment.
    #[default]
    FullTime,
    /// Part-time employment.
    PartTime,
    /// Fixed-term contractor.
    Contract,
    /// Intern or trainee.
    Intern,
}

impl EmploymentType {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Intern => "Intern",
        }
    }
}

/// Where an employee is in their employment lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Currently employed and working.
    #[default]
    Active,
    /// Employed but on extended leave.
    OnLeave,
    /// No longer employed.
    Terminated,
}

impl EmploymentStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "Active",
            EmploymentStatus::OnLeave => "On leave",
            EmploymentStatus::Terminated => "Terminated",
        }
    }
}

/// Where the employee usually works from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkArrangement {
    /// Works from the office.
    #[default]
    Onsite,
    /// Works remotely.
    Remote,
    /// Splits time between office and home.
    Hybrid,
}

impl WorkArrangement {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            WorkArrangement::Onsite => "On-site",
            WorkArrangement::Remote => "Remote",
            WorkArrangement::Hybrid => "Hybrid",
        }
    }
}

/// An organizational unit. Departments may nest under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier.
    pub id: u64,
    /// Display name (e.g. "Engineering").
    pub name: String,
    /// Parent department, if any.
    pub parent_id: Option<u64>,
}

/// Represents a person employed by the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: u64,
    /// The login account linked to this employee, if any.
    pub user_id: Option<u64>,
    /// Full name.
    pub name: String,
    /// Work e-mail address.
    pub email: String,
    /// Job title.
    pub job_title: String,
    /// Department the employee belongs to.
    pub department_id: Option<u64>,
    /// The employee's manager. Never equal to `id`.
    pub manager_id: Option<u64>,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// The type of employment arrangement.
    #[serde(default)]
    pub employment_type: EmploymentType,
    /// Lifecycle status.
    #[serde(default)]
    pub status: EmploymentStatus,
    /// Office or city.
    pub location: Option<String>,
    /// On-site, remote or hybrid.
    #[serde(default)]
    pub work_arrangement: WorkArrangement,
    /// Base salary amount.
    pub base_salary: Option<Decimal>,
    /// ISO currency code for `base_salary`.
    pub currency: Option<String>,
    /// How often `base_salary` is paid (e.g. "annually").
    pub pay_frequency: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; deleted employees are hidden by the store.
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// Lower-cased tokens of the full name longer than two characters.
    ///
    /// These are the tokens the chat assistant looks for when a message
    /// refers to a person.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hcm_assistant::models::Employee;
    /// # use chrono::{NaiveDate, Utc};
    /// # let now = Utc::now();
    /// let employee = Employee {
    ///     id: 7,
    ///     user_id: None,
    ///     name: "Grace Lee".to_string(),
    ///     email: "grace.lee@company.com".to_string(),
    ///     job_title: "DevOps Engineer".to_string(),
    ///     department_id: Some(1),
    ///     manager_id: Some(1),
    ///     hire_date: NaiveDate::from_ymd_opt(2020, 7, 22).unwrap(),
    ///     employment_type: Default::default(),
    ///     status: Default::default(),
    ///     location: None,
    ///     work_arrangement: Default::default(),
    ///     base_salary: None,
    ///     currency: None,
    ///     pay_frequency: None,
    ///     created_at: now,
    ///     updated_at: now,
    ///     deleted_at: None,
    /// };
    /// assert_eq!(employee.name_tokens(), vec!["grace", "lee"]);
    /// ```
    pub fn name_tokens(&self) -> Vec<String> {
        self.name
            .split_whitespace()
            .map(|token| token.to_lowercase())
            .filter(|token| token.chars().count() > 2)
            .collect()
    }

    /// Returns true if the employee has not been soft-deleted.
    pub fn is_visible(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Formats the base salary as `amount currency (frequency)`.
    pub fn display_base_salary(&self) -> Option<String> {
        self.base_salary.map(|amount| {
            format!(
                "{:.2} {} ({})",
                amount.round_dp(2),
                self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                self.pay_frequency
                    .as_deref()
                    .unwrap_or(DEFAULT_EMPLOYEE_PAY_FREQUENCY)
            )
        })
    }
}

/// An employee together with the associations the store preloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeDetails {
    /// The employee itself.
    #[serde(flatten)]
    pub employee: Employee,
    /// The employee's department.
    pub department: Option<Department>,
    /// The employee's manager.
    pub manager: Option<Employee>,
    /// Everyone whose manager is this employee, in store order.
    pub reports: Vec<Employee>,
}

/// Input for creating an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Full name.
    pub name: String,
    /// Work e-mail address.
    pub email: String,
    /// Job title.
    #[serde(default)]
    pub job_title: String,
    /// Department the employee belongs to.
    #[serde(default)]
    pub department_id: Option<u64>,
    /// The employee's manager.
    #[serde(default)]
    pub manager_id: Option<u64>,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// Linked login account.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// The type of employment arrangement.
    #[serde(default)]
    pub employment_type: EmploymentType,
    /// Lifecycle status.
    #[serde(default)]
    pub status: EmploymentStatus,
    /// Office or city.
    #[serde(default)]
    pub location: Option<String>,
    /// On-site, remote or hybrid.
    #[serde(default)]
    pub work_arrangement: WorkArrangement,
    /// Base salary amount.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Pay frequency.
    #[serde(default)]
    pub pay_frequency: Option<String>,
}

impl NewEmployee {
    /// Checks required fields before the employee reaches the store.
    pub fn validate(&self) -> HcmResult<()> {
        validate_name(&self.name)?;
        validate_email(&self.email)
    }
}

/// A partial edit of an employee. Absent fields are left untouched; an
/// explicit `null` clears optional references such as `manager_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    /// New full name.
    #[serde(default)]
    pub name: Option<String>,
    /// New e-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// New job title.
    #[serde(default)]
    pub job_title: Option<String>,
    /// New department (`null` clears it).
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<u64>>,
    /// New manager (`null` clears it).
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<u64>>,
    /// New hire date.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// New employment type.
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    /// New status.
    #[serde(default)]
    pub status: Option<EmploymentStatus>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// New work arrangement.
    #[serde(default)]
    pub work_arrangement: Option<WorkArrangement>,
    /// New base salary.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// New currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// New pay frequency.
    #[serde(default)]
    pub pay_frequency: Option<String>,
}

impl EmployeeUpdate {
    /// Applies the edit to a copy of `employee`, validating changed fields.
    pub fn apply_to(self, employee: &Employee) -> HcmResult<Employee> {
        let mut updated = employee.clone();
        if let Some(name) = self.name {
            validate_name(&name)?;
            updated.name = name;
        }
        if let Some(email) = self.email {
            validate_email(&email)?;
            updated.email = email;
        }
        if let Some(job_title) = self.job_title {
            updated.job_title = job_title;
        }
        if let Some(department_id) = self.department_id {
            updated.department_id = department_id;
        }
        if let Some(manager_id) = self.manager_id {
            updated.manager_id = manager_id;
        }
        if let Some(hire_date) = self.hire_date {
            updated.hire_date = hire_date;
        }
        if let Some(employment_type) = self.employment_type {
            updated.employment_type = employment_type;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if self.location.is_some() {
            updated.location = self.location;
        }
        if let Some(work_arrangement) = self.work_arrangement {
            updated.work_arrangement = work_arrangement;
        }
        if self.base_salary.is_some() {
            updated.base_salary = self.base_salary;
        }
        if self.currency.is_some() {
            updated.currency = self.currency;
        }
        if self.pay_frequency.is_some() {
            updated.pay_frequency = self.pay_frequency;
        }
        Ok(updated)
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_name(name: &str) -> HcmResult<()> {
    if name.trim().is_empty() {
        return Err(HcmError::InvalidEmployee {
            field: "name".to_string(),
            message: "name is required".to_string(),
        });
    }
    Ok(())
}

fn validate_email(email: &str) -> HcmResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(HcmError::InvalidEmployee {
            field: "email".to_string(),
            message: format!("'{}' is not a valid e-mail address", email),
        });
    }
    Ok(())
}

/// Rejects a manager assignment that would break the reporting tree.
///
/// `manager_of` returns `None` for an unknown employee id, otherwise that
/// employee's own manager. The chain is walked upward from the proposed
/// manager; reaching `employee_id` again means a cycle.
///
/// # Examples
///
/// ```
/// use hcm_assistant::models::check_reporting_line;
///
/// // 2 reports to 1; making 1 report to 2 would loop.
/// let manager_of = |id: u64| match id {
///     1 => Some(None),
///     2 => Some(Some(1)),
///     _ => None,
/// };
/// assert!(check_reporting_line(1, Some(2), manager_of).is_err());
/// assert!(check_reporting_line(3, Some(2), manager_of).is_ok());
/// assert!(check_reporting_line(3, Some(3), manager_of).is_err());
/// ```
pub fn check_reporting_line<F>(employee_id: u64, manager_id: Option<u64>, manager_of: F) -> HcmResult<()>
where
    F: Fn(u64) -> Option<Option<u64>>,
{
    let Some(manager_id) = manager_id else {
        return Ok(());
    };
    if manager_id == employee_id {
        return Err(HcmError::InvalidEmployee {
            field: "manager_id".to_string(),
            message: "an employee cannot be their own manager".to_string(),
        });
    }

    let mut next = manager_of(manager_id).ok_or_else(|| HcmError::InvalidEmployee {
        field: "manager_id".to_string(),
        message: format!("manager {} does not exist", manager_id),
    })?;
    let mut seen = HashSet::from([manager_id]);

    while let Some(current) = next {
        if current == employee_id {
            return Err(HcmError::InvalidEmployee {
                field: "manager_id".to_string(),
                message: format!(
                    "assigning manager {} would create a reporting cycle",
                    manager_id
                ),
            });
        }
        // A loop above us that does not pass through this employee is not ours to fix.
        if !seen.insert(current) {
            break;
        }
        next = manager_of(current).flatten();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn create_test_employee(id: u64, name: &str, manager_id: Option<u64>) -> Employee {
        let now = Utc.with_ymd_and_hms(2025, 10, 14, 9, 0, 0).unwrap();
        Employee {
            id,
            user_id: None,
            name: name.to_string(),
            email: format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
            job_title: "Engineer".to_string(),
            department_id: Some(1),
            manager_id,
            hire_date: NaiveDate::from_ymd_opt(2021, 3, 20).unwrap(),
            employment_type: EmploymentType::FullTime,
            status: EmploymentStatus::Active,
            location: None,
            work_arrangement: WorkArrangement::Onsite,
            base_salary: None,
            currency: None,
            pay_frequency: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_name_tokens_skip_short_parts() {
        let employee = create_test_employee(1, "Jo Ann Smith", None);
        assert_eq!(employee.name_tokens(), vec!["ann", "smith"]);
    }

    #[test]
    fn test_display_base_salary_defaults() {
        let mut employee = create_test_employee(1, "Alice Johnson", None);
        assert_eq!(employee.display_base_salary(), None);

        employee.base_salary = Some(Decimal::new(95000, 0));
        assert_eq!(
            employee.display_base_salary().as_deref(),
            Some("95000.00 USD (annually)")
        );

        employee.currency = Some("EUR".to_string());
        employee.pay_frequency = Some("Monthly".to_string());
        assert_eq!(
            employee.display_base_salary().as_deref(),
            Some("95000.00 EUR (Monthly)")
        );
    }

    #[test]
    fn test_deserialize_new_employee_defaults() {
        let json = r#"{
            "name": "Kim Park",
            "email": "kim.park@company.com",
            "hire_date": "2024-02-01"
        }"#;
        let input: NewEmployee = serde_json::from_str(json).unwrap();
        assert_eq!(input.employment_type, EmploymentType::FullTime);
        assert_eq!(input.status, EmploymentStatus::Active);
        assert_eq!(input.manager_id, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_new_employee_rejects_bad_email() {
        let input = NewEmployee {
            name: "Kim Park".to_string(),
            email: "not-an-email".to_string(),
            job_title: String::new(),
            department_id: None,
            manager_id: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            user_id: None,
            employment_type: EmploymentType::FullTime,
            status: EmploymentStatus::Active,
            location: None,
            work_arrangement: WorkArrangement::Remote,
            base_salary: None,
            currency: None,
            pay_frequency: None,
        };
        match input.validate() {
            Err(HcmError::InvalidEmployee { field, .. }) => assert_eq!(field, "email"),
            other => panic!("Expected InvalidEmployee, got {:?}", other),
        }
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let employee = create_test_employee(2, "Bob Smith", Some(1));

        let untouched: EmployeeUpdate = serde_json::from_str(r#"{"job_title": "Lead"}"#).unwrap();
        let updated = untouched.apply_to(&employee).unwrap();
        assert_eq!(updated.manager_id, Some(1));
        assert_eq!(updated.job_title, "Lead");

        let cleared: EmployeeUpdate = serde_json::from_str(r#"{"manager_id": null}"#).unwrap();
        let updated = cleared.apply_to(&employee).unwrap();
        assert_eq!(updated.manager_id, None);
    }

    #[test]
    fn test_reporting_line_rejects_self_and_cycles() {
        let employees: HashMap<u64, Employee> = [
            create_test_employee(1, "Alice Johnson", None),
            create_test_employee(2, "Bob Smith", Some(1)),
            create_test_employee(3, "Carol White", Some(2)),
        ]
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
        let manager_of = |id: u64| employees.get(&id).map(|e| e.manager_id);

        assert!(check_reporting_line(2, Some(2), manager_of).is_err());
        // 1 -> 3 -> 2 -> 1
        assert!(check_reporting_line(1, Some(3), manager_of).is_err());
        assert!(check_reporting_line(3, Some(1), manager_of).is_ok());
        assert!(check_reporting_line(3, None, manager_of).is_ok());
        assert!(check_reporting_line(3, Some(99), manager_of).is_err());
    }

    #[test]
    fn test_employment_type_serialization() {
        assert_eq!(
            serde_json::to_string(&EmploymentType::FullTime).unwrap(),
            "\"full_time\""
        );
        assert_eq!(
            serde_json::to_string(&WorkArrangement::Hybrid).unwrap(),
            "\"hybrid\""
        );
        assert_eq!(
            serde_json::to_string(&EmploymentStatus::OnLeave).unwrap(),
            "\"on_leave\""
        );
    }
}
