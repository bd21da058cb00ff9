//! Demo data loaded at startup.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{HcmError, HcmResult};
use crate::models::{NewEmployee, NewUser, Setting};

use super::{EntityStore, MemoryStore};

/// What [`seed_demo_data`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Departments created.
    pub departments: usize,
    /// Employees created, each with a linked user account.
    pub employees: usize,
    /// Settings created.
    pub settings: usize,
}

struct SeedEmployee {
    name: &'static str,
    department: usize,
    job_title: &'static str,
    hired: (i32, u32, u32),
    manager: Option<u64>,
    base_salary: Option<i64>,
}

const DEPARTMENTS: [&str; 3] = ["Engineering", "Human Resources", "Sales"];

const EMPLOYEES: [SeedEmployee; 10] = [
    SeedEmployee { name: "Alice Johnson", department: 0, job_title: "Senior Software Engineer", hired: (2020, 1, 15), manager: None, base_salary: Some(95000) },
    SeedEmployee { name: "Bob Smith", department: 0, job_title: "Frontend Developer", hired: (2021, 3, 20), manager: Some(1), base_salary: Some(75000) },
    SeedEmployee { name: "Carol White", department: 1, job_title: "HR Manager", hired: (2019, 6, 10), manager: None, base_salary: Some(85000) },
    SeedEmployee { name: "David Brown", department: 1, job_title: "Recruiter", hired: (2022, 2, 5), manager: Some(3), base_salary: Some(55000) },
    SeedEmployee { name: "Emma Davis", department: 2, job_title: "Sales Director", hired: (2018, 9, 1), manager: None, base_salary: Some(110000) },
    SeedEmployee { name: "Frank Wilson", department: 2, job_title: "Account Executive", hired: (2021, 11, 15), manager: Some(5), base_salary: None },
    SeedEmployee { name: "Grace Lee", department: 0, job_title: "DevOps Engineer", hired: (2020, 7, 22), manager: Some(1), base_salary: None },
    SeedEmployee { name: "Henry Martinez", department: 2, job_title: "Sales Representative", hired: (2023, 1, 10), manager: Some(5), base_salary: None },
    SeedEmployee { name: "Iris Taylor", department: 1, job_title: "HR Coordinator", hired: (2022, 8, 30), manager: Some(3), base_salary: None },
    SeedEmployee { name: "Jack Anderson", department: 0, job_title: "Backend Developer", hired: (2021, 5, 18), manager: Some(1), base_salary: None },
];

const SETTINGS: [(&str, &str, &str); 3] = [
    ("company_name", "Acme Corp", "Name the assistant uses for the company"),
    ("tone", "friendly and concise", "How the assistant should sound"),
    (
        "leave_policy",
        "Employees accrue 20 vacation days per year; sick leave needs a note after 3 days.",
        "Summary of the leave policy",
    ),
];

fn seed_date(y: i32, m: u32, d: u32) -> HcmResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| HcmError::Store {
        message: format!("invalid seed date {}-{}-{}", y, m, d),
    })
}

/// Loads three departments, ten employees with user accounts and reporting
/// lines, base salary components, and the default chatbot settings.
///
/// Every account uses the lower-cased first name as its user name and shares
/// `password_hash`. Employees are inserted managers-first so each reporting
/// line passes validation. Ids are assigned in insertion order, starting at 1
/// in an empty store.
pub async fn seed_demo_data(store: &MemoryStore, password_hash: &str) -> HcmResult<SeedSummary> {
    let mut department_ids = Vec::with_capacity(DEPARTMENTS.len());
    for name in DEPARTMENTS {
        department_ids.push(store.insert_department(name, None).await.id);
    }

    let salary_effective = seed_date(2024, 1, 1)?;
    for seed in &EMPLOYEES {
        let email = format!("{}@company.com", seed.name.to_lowercase().replace(' ', "."));
        let username = seed
            .name
            .split_whitespace()
            .next()
            .unwrap_or(seed.name)
            .to_lowercase();
        let user = store
            .create_user(NewUser {
                username,
                email: email.clone(),
                password_hash: password_hash.to_string(),
            })
            .await?;

        let (y, m, d) = seed.hired;
        let employee = store
            .create_employee(NewEmployee {
                name: seed.name.to_string(),
                email,
                job_title: seed.job_title.to_string(),
                department_id: department_ids.get(seed.department).copied(),
                manager_id: seed.manager,
                hire_date: seed_date(y, m, d)?,
                user_id: Some(user.id),
                employment_type: Default::default(),
                status: Default::default(),
                location: None,
                work_arrangement: Default::default(),
                base_salary: seed.base_salary.map(|amount| Decimal::new(amount, 0)),
                currency: None,
                pay_frequency: None,
            })
            .await?;

        if let Some(amount) = seed.base_salary {
            store
                .insert_salary_component(
                    employee.id,
                    "Base Salary",
                    Decimal::new(amount, 0),
                    None,
                    salary_effective,
                )
                .await?;
        }
    }

    for (key, value, description) in SETTINGS {
        store
            .upsert_setting(Setting {
                key: key.to_string(),
                value: value.to_string(),
                description: description.to_string(),
            })
            .await?;
    }

    let summary = SeedSummary {
        departments: DEPARTMENTS.len(),
        employees: EMPLOYEES.len(),
        settings: SETTINGS.len(),
    };
    info!(
        departments = summary.departments,
        employees = summary.employees,
        "Seeded demo data; user names are lower-case first names"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EmployeeFilter;

    #[tokio::test]
    async fn test_seed_builds_reporting_lines() {
        let store = MemoryStore::new();
        let summary = seed_demo_data(&store, "hash").await.unwrap();
        assert_eq!(summary.employees, 10);

        let alice = store.employee_details(1).await.unwrap().unwrap();
        assert_eq!(alice.employee.name, "Alice Johnson");
        let reports: Vec<&str> = alice.reports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(reports, vec!["Bob Smith", "Grace Lee", "Jack Anderson"]);
        assert_eq!(alice.department.map(|d| d.name).as_deref(), Some("Engineering"));

        let bob = store.employees(&EmployeeFilter::reports_of(2)).await.unwrap();
        assert!(bob.is_empty());
    }

    #[tokio::test]
    async fn test_seed_links_user_accounts() {
        let store = MemoryStore::new();
        seed_demo_data(&store, "hash").await.unwrap();

        let david = store.user_by_username("david").await.unwrap().unwrap();
        let employee = store.employee_for_user(david.id).await.unwrap().unwrap();
        assert_eq!(employee.name, "David Brown");
        assert_eq!(employee.manager_id, Some(3));

        assert_eq!(store.salary_components(None).await.unwrap().len(), 5);
        assert_eq!(store.settings().await.unwrap()[0].key, "company_name");
    }
}
