//! Local query handlers.
//!
//! Every question that needs named employee data is answered here from the
//! entity store. [`Query::detect`] picks the report from an ordered keyword
//! table, the same way [`super::intent::classify`] picks the intent, and
//! [`answer`] renders it as plain text. Missing departments, managers and
//! empty result sets render as "N/A" or a "no results" sentence.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::HcmResult;
use crate::models::{
    Attendance, AttendanceFilter, Department, Employee, LeaveFilter, LeaveRequest, LeaveStatus,
};
use crate::store::{EmployeeFilter, EntityStore};

use super::intent::contains_any;
use super::names::{NameMatch, clarification, resolve_employee};
use super::trace::ChatTrace;

const NOT_AVAILABLE: &str = "N/A";

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// A report answered from store data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Employees with no attendance record today.
    NotClockedIn,
    /// First arrivals today.
    EarliestArrival,
    /// Last arrivals today.
    LatestArrival,
    /// Everyone's attendance today.
    AttendanceToday,
    /// Approved leave covering today, or overlapping the current month.
    OnLeave {
        /// Widen from today to the whole calendar month.
        this_month: bool,
    },
    /// Leave requests overlapping a month of the current year (1-12).
    LeaveByMonth(u32),
    /// Leave requests, optionally in one state.
    LeaveRequests(Option<LeaveStatus>),
    /// Employees ranked by years of service.
    Tenure,
    /// Salary of one employee, or everyone's base salary.
    Salary,
    /// Manager and reports of one employee, or every reporting line.
    OrgStructure,
    /// Employee count, total and per department.
    Headcount,
    /// Members of a department, or the department list.
    Department,
    /// Profile of one employee.
    Profile,
    /// Everyone, as a directory.
    Directory,
}

const NOT_CLOCKED_IN: &[&str] = &[
    "hasn't clocked in", "has not clocked in", "haven't clocked in", "have not clocked in",
    "not clocked in", "didn't clock in", "did not clock in", "not checked in",
    "hasn't checked in", "haven't checked in", "absent", "who is missing",
];

const EARLIEST: &[&str] = &[
    "earliest", "first to arrive", "arrived first", "came in first", "first in today",
    "early bird",
];

const LATEST: &[&str] = &[
    "latest", "last to arrive", "arrived last", "came in last", "last in today",
];

const ATTENDANCE: &[&str] = &[
    "attendance", "clocked in", "checked in", "clocked out", "who is in", "who's in",
    "in the office", "arrived", "arrival",
];

/// Roster phrasing that reads as attendance unless a department follows.
const ROSTER: &[&str] = &["who is in", "who's in", "who works in"];

const ON_LEAVE: &[&str] = &[
    "on leave", "out of office", "away today", "off today", "on vacation", "on holiday",
];

const TENURE: &[&str] = &[
    "tenure", "longest", "seniority", "years of service", "most senior", "been here",
    "longest serving",
];

const SALARY: &[&str] = &[
    "salary", "salaries", "pay", "compensation", "wage", "earn", "bonus",
];

const ORG: &[&str] = &[
    "reports to", "report to", "reporting to", "direct report", "manager", "managed by",
    "manages", "org structure", "reporting line", "reporting chain", "boss", "team",
];

const HEADCOUNT: &[&str] = &[
    "how many", "headcount", "head count", "number of employees", "number of people",
    "total employees",
];

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Month named in `text`. "may" only counts after "in", "during", "for" or
/// "of", so "may i see..." is not May.
fn mentioned_month(text: &str) -> Option<u32> {
    let words = words(text);
    words.iter().enumerate().find_map(|(i, word)| {
        let index = MONTHS.iter().position(|m| m == word)?;
        if *word == "may" {
            let previous = i.checked_sub(1).and_then(|p| words.get(p))?;
            if !["in", "during", "for", "of"].contains(previous) {
                return None;
            }
        }
        u32::try_from(index + 1).ok()
    })
}

fn requested_status(text: &str) -> Option<LeaveStatus> {
    if text.contains("pending") {
        Some(LeaveStatus::Pending)
    } else if text.contains("approved") {
        Some(LeaveStatus::Approved)
    } else if text.contains("rejected") {
        Some(LeaveStatus::Rejected)
    } else {
        None
    }
}

fn mentioned_department<'a>(text: &str, departments: &'a [Department]) -> Option<&'a Department> {
    departments.iter().find(|d| {
        let name = d.name.trim().to_lowercase();
        !name.is_empty() && text.contains(name.as_str())
    })
}

impl Query {
    /// Picks the report for `text` (already lower-cased). The first matching
    /// row wins; [`Query::Directory`] is the fallback.
    ///
    /// `departments` and `employees` decide the department and profile rows.
    pub fn detect(text: &str, departments: &[Department], employees: &[Employee]) -> Self {
        let about_leave = text.contains("leave");
        let month = if about_leave { mentioned_month(text) } else { None };
        let department_roster =
            contains_any(text, ROSTER) && mentioned_department(text, departments).is_some();
        if contains_any(text, NOT_CLOCKED_IN) {
            Query::NotClockedIn
        } else if contains_any(text, EARLIEST) && !about_leave {
            Query::EarliestArrival
        } else if contains_any(text, LATEST) && !about_leave {
            Query::LatestArrival
        } else if department_roster {
            Query::Department
        } else if contains_any(text, ATTENDANCE) {
            Query::AttendanceToday
        } else if contains_any(text, ON_LEAVE) {
            Query::OnLeave {
                this_month: text.contains("this month"),
            }
        } else if let Some(month) = month {
            Query::LeaveByMonth(month)
        } else if about_leave {
            Query::LeaveRequests(requested_status(text))
        } else if contains_any(text, TENURE) {
            Query::Tenure
        } else if contains_any(text, SALARY) {
            Query::Salary
        } else if contains_any(text, ORG) {
            Query::OrgStructure
        } else if contains_any(text, HEADCOUNT) {
            Query::Headcount
        } else if text.contains("department") || mentioned_department(text, departments).is_some() {
            Query::Department
        } else if resolve_employee(text, employees) != NameMatch::NoMatch {
            Query::Profile
        } else {
            Query::Directory
        }
    }
}

/// Store snapshot and request facts shared by every report.
pub struct QueryContext<'a> {
    /// Where attendance, leave and salary records are read from.
    pub store: &'a dyn EntityStore,
    /// The instant "today" is taken from.
    pub now: DateTime<Utc>,
    /// The asking employee, when the caller has a record.
    pub caller: Option<&'a Employee>,
    /// Every visible employee, in store order.
    pub employees: &'a [Employee],
    /// Every department, in store order.
    pub departments: &'a [Department],
    /// How many arrivals the earliest/latest reports list.
    pub top_arrivals: usize,
}

impl QueryContext<'_> {
    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn employee(&self, id: u64) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    fn name_of(&self, id: u64) -> String {
        self.employee(id)
            .map_or_else(|| format!("Employee #{}", id), |e| e.name.clone())
    }

    fn department_name(&self, id: Option<u64>) -> &str {
        id.and_then(|id| self.departments.iter().find(|d| d.id == id))
            .map_or(NOT_AVAILABLE, |d| d.name.as_str())
    }

    fn reports_of(&self, manager_id: u64) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| e.manager_id == Some(manager_id))
            .collect()
    }
}

/// Answers `text` (already lower-cased) with the report [`Query::detect`]
/// picks.
pub async fn answer(ctx: &QueryContext<'_>, text: &str, trace: &mut ChatTrace) -> HcmResult<String> {
    let query = Query::detect(text, ctx.departments, ctx.employees);
    trace.step(format!("Local query: {:?}", query));
    match query {
        Query::NotClockedIn => not_clocked_in(ctx).await,
        Query::EarliestArrival => arrivals(ctx, true).await,
        Query::LatestArrival => arrivals(ctx, false).await,
        Query::AttendanceToday => attendance_today(ctx).await,
        Query::OnLeave { this_month } => on_leave(ctx, this_month).await,
        Query::LeaveByMonth(month) => leave_by_month(ctx, month).await,
        Query::LeaveRequests(status) => leave_requests(ctx, status).await,
        Query::Tenure => Ok(tenure_ranking(ctx.employees, ctx.today())),
        Query::Salary => salary(ctx, text).await,
        Query::OrgStructure => Ok(org_structure(ctx, text)),
        Query::Headcount => Ok(headcount(ctx)),
        Query::Department => Ok(department(ctx, text)),
        Query::Profile => Ok(profile(ctx, text)),
        Query::Directory => Ok(directory(ctx)),
    }
}

async fn todays_attendance(ctx: &QueryContext<'_>) -> HcmResult<Vec<Attendance>> {
    ctx.store.attendance(&AttendanceFilter::on(ctx.today())).await
}

fn hhmm(instant: DateTime<Utc>) -> String {
    instant.format("%H:%M UTC").to_string()
}

async fn not_clocked_in(ctx: &QueryContext<'_>) -> HcmResult<String> {
    let present: HashSet<u64> = todays_attendance(ctx)
        .await?
        .iter()
        .map(|r| r.employee_id)
        .collect();
    let missing: Vec<&Employee> = ctx
        .employees
        .iter()
        .filter(|e| !present.contains(&e.id))
        .collect();
    if missing.is_empty() {
        return Ok(format!("Everyone has clocked in today ({}).", ctx.today()));
    }
    let lines: Vec<String> = missing
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {} ({})", i + 1, e.name, e.job_title))
        .collect();
    Ok(format!(
        "{} employee(s) haven't clocked in today ({}):\n{}",
        missing.len(),
        ctx.today(),
        lines.join("\n")
    ))
}

async fn arrivals(ctx: &QueryContext<'_>, earliest: bool) -> HcmResult<String> {
    let mut records = todays_attendance(ctx).await?;
    if records.is_empty() {
        return Ok(format!("No one has clocked in today ({}) yet.", ctx.today()));
    }
    if earliest {
        records.sort_by_key(|r| r.clock_in);
    } else {
        records.sort_by(|a, b| b.clock_in.cmp(&a.clock_in));
    }
    let lines: Vec<String> = records
        .iter()
        .take(ctx.top_arrivals)
        .enumerate()
        .map(|(i, r)| format!("{}. {} at {}", i + 1, ctx.name_of(r.employee_id), hhmm(r.clock_in)))
        .collect();
    Ok(format!(
        "{} arrivals today ({}):\n{}",
        if earliest { "Earliest" } else { "Latest" },
        ctx.today(),
        lines.join("\n")
    ))
}

async fn attendance_today(ctx: &QueryContext<'_>) -> HcmResult<String> {
    let records = todays_attendance(ctx).await?;
    if records.is_empty() {
        return Ok(format!("No attendance has been recorded today ({}).", ctx.today()));
    }
    let present: HashSet<u64> = records.iter().map(|r| r.employee_id).collect();
    let lines: Vec<String> = records
        .iter()
        .map(|r| match (r.clock_out, r.worked()) {
            (Some(out), Some(worked)) => format!(
                "- {}: in {}, out {} ({})",
                ctx.name_of(r.employee_id),
                hhmm(r.clock_in),
                hhmm(out),
                worked
            ),
            _ => format!("- {}: in {}, still working", ctx.name_of(r.employee_id), hhmm(r.clock_in)),
        })
        .collect();
    Ok(format!(
        "Attendance today ({}): {} of {} employees clocked in.\n{}",
        ctx.today(),
        present.len(),
        ctx.employees.len(),
        lines.join("\n")
    ))
}

fn leave_line(ctx: &QueryContext<'_>, request: &LeaveRequest, with_status: bool) -> String {
    let line = format!(
        "- {}: {}, {} to {} ({} day{})",
        ctx.name_of(request.employee_id),
        request.leave_type,
        request.start_date,
        request.end_date,
        request.day_count(),
        if request.day_count() == 1 { "" } else { "s" }
    );
    if with_status {
        format!("{}, {}", line, request.status)
    } else {
        line
    }
}

/// First and last day of a calendar month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Approved leave on `date`, in store order.
pub fn on_leave_on(requests: &[LeaveRequest], date: NaiveDate) -> Vec<&LeaveRequest> {
    requests
        .iter()
        .filter(|r| r.status == LeaveStatus::Approved && r.covers(date))
        .collect()
}

async fn on_leave(ctx: &QueryContext<'_>, this_month: bool) -> HcmResult<String> {
    let approved = ctx
        .store
        .leave_requests(&LeaveFilter::with_status(LeaveStatus::Approved))
        .await?;
    let today = ctx.today();

    let (matching, period) = if this_month {
        let Some((first, last)) = month_bounds(today.year(), today.month()) else {
            return Ok("I couldn't work out the current month.".to_string());
        };
        let matching: Vec<&LeaveRequest> = approved.iter().filter(|r| r.overlaps(first, last)).collect();
        (matching, format!("this month ({})", today.format("%B %Y")))
    } else {
        (on_leave_on(&approved, today), format!("today ({})", today))
    };

    if matching.is_empty() {
        return Ok(format!("No one is on approved leave {}.", period));
    }
    let lines: Vec<String> = matching.iter().map(|r| leave_line(ctx, r, false)).collect();
    Ok(format!("Employees on leave {}:\n{}", period, lines.join("\n")))
}

async fn leave_by_month(ctx: &QueryContext<'_>, month: u32) -> HcmResult<String> {
    let year = ctx.today().year();
    let Some((first, last)) = month_bounds(year, month) else {
        return Ok("I couldn't work out which month you mean.".to_string());
    };
    let label = first.format("%B %Y");
    let requests = ctx.store.leave_requests(&LeaveFilter::default()).await?;
    let lines: Vec<String> = requests
        .iter()
        .filter(|r| r.overlaps(first, last))
        .map(|r| leave_line(ctx, r, true))
        .collect();
    if lines.is_empty() {
        return Ok(format!("No leave requests overlap {}.", label));
    }
    Ok(format!("Leave requests overlapping {}:\n{}", label, lines.join("\n")))
}

async fn leave_requests(ctx: &QueryContext<'_>, status: Option<LeaveStatus>) -> HcmResult<String> {
    let filter = LeaveFilter {
        employee_id: None,
        status,
    };
    let mut requests = ctx.store.leave_requests(&filter).await?;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (heading, none) = match status {
        Some(status) => (
            format!("{} leave requests", status),
            format!("There are no {} leave requests.", status.to_string().to_lowercase()),
        ),
        None => ("Leave requests".to_string(), "There are no leave requests.".to_string()),
    };
    if requests.is_empty() {
        return Ok(none);
    }
    let lines: Vec<String> = requests
        .iter()
        .map(|r| leave_line(ctx, r, status.is_none()))
        .collect();
    Ok(format!("{}:\n{}", heading, lines.join("\n")))
}

/// Years between `hire_date` and `today`, as days over 365.25.
pub fn tenure_years(hire_date: NaiveDate, today: NaiveDate) -> Decimal {
    Decimal::from((today - hire_date).num_days()) / Decimal::new(36525, 2)
}

/// Everyone ranked by tenure, longest first. Ties keep store order.
pub fn tenure_ranking(employees: &[Employee], today: NaiveDate) -> String {
    if employees.is_empty() {
        return "There are no employees on record.".to_string();
    }
    let mut ranked: Vec<(&Employee, Decimal)> = employees
        .iter()
        .map(|e| (e, tenure_years(e.hire_date, today)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let lines: Vec<String> = ranked
        .iter()
        .enumerate()
        .map(|(i, (e, years))| format!("{}. {}: {:.2} years (hired {})", i + 1, e.name, years.round_dp(2), e.hire_date))
        .collect();
    format!("Employees by tenure as of {}:\n{}", today, lines.join("\n"))
}

/// The caller when the message says "my"/"me" and names nobody else.
fn subject<'a>(ctx: &QueryContext<'a>, text: &str) -> NameMatch<'a> {
    match resolve_employee(text, ctx.employees) {
        NameMatch::NoMatch => {
            let words = words(text);
            let about_self = words.iter().any(|w| matches!(*w, "my" | "me" | "i" | "mine"));
            match ctx.caller {
                Some(caller) if about_self => NameMatch::Unique(caller),
                _ => NameMatch::NoMatch,
            }
        }
        found => found,
    }
}

async fn salary(ctx: &QueryContext<'_>, text: &str) -> HcmResult<String> {
    match subject(ctx, text) {
        NameMatch::Unique(employee) => {
            let components = ctx.store.salary_components(Some(employee.id)).await?;
            let mut lines = vec![format!(
                "- Base salary: {}",
                employee
                    .display_base_salary()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            )];
            lines.extend(components.iter().map(|c| {
                format!("- {}: {}, effective {}", c.component_type, c.display_amount(), c.effective_date)
            }));
            if components.is_empty() {
                lines.push("- No salary components on record.".to_string());
            }
            Ok(format!("Salary for {}:\n{}", employee.name, lines.join("\n")))
        }
        NameMatch::Ambiguous(candidates) => Ok(clarification(&candidates)),
        NameMatch::NoMatch => {
            if ctx.employees.is_empty() {
                return Ok("There are no employees on record.".to_string());
            }
            let lines: Vec<String> = ctx
                .employees
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "{}. {}: {}",
                        i + 1,
                        e.name,
                        e.display_base_salary()
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                    )
                })
                .collect();
            Ok(format!("Base salaries:\n{}", lines.join("\n")))
        }
    }
}

fn names(employees: &[&Employee]) -> String {
    employees
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn org_structure(ctx: &QueryContext<'_>, text: &str) -> String {
    match subject(ctx, text) {
        NameMatch::Unique(employee) => {
            let manager = match employee.manager_id {
                Some(id) => match ctx.employee(id) {
                    Some(m) => format!("{} ({})", m.name, m.job_title),
                    None => NOT_AVAILABLE.to_string(),
                },
                None => "none (top level)".to_string(),
            };
            let reports = ctx.reports_of(employee.id);
            format!(
                "{} ({}, {})\nManager: {}\nDirect reports: {}",
                employee.name,
                employee.job_title,
                ctx.department_name(employee.department_id),
                manager,
                if reports.is_empty() { "none".to_string() } else { names(&reports) }
            )
        }
        NameMatch::Ambiguous(candidates) => clarification(&candidates),
        NameMatch::NoMatch => {
            let lines: Vec<String> = ctx
                .employees
                .iter()
                .filter_map(|e| {
                    let reports = ctx.reports_of(e.id);
                    (!reports.is_empty()).then(|| format!("- {} manages {}", e.name, names(&reports)))
                })
                .collect();
            if lines.is_empty() {
                return "No reporting lines are recorded.".to_string();
            }
            let top: Vec<&Employee> = ctx.employees.iter().filter(|e| e.manager_id.is_none()).collect();
            format!(
                "Reporting structure:\n{}\nTop level: {}",
                lines.join("\n"),
                if top.is_empty() { "none".to_string() } else { names(&top) }
            )
        }
    }
}

fn headcount(ctx: &QueryContext<'_>) -> String {
    let mut per_department: BTreeMap<Option<u64>, usize> = BTreeMap::new();
    for e in ctx.employees {
        *per_department.entry(e.department_id).or_default() += 1;
    }
    let mut lines: Vec<String> = ctx
        .departments
        .iter()
        .map(|d| format!("- {}: {}", d.name, per_department.get(&Some(d.id)).copied().unwrap_or(0)))
        .collect();
    let unassigned: usize = per_department
        .iter()
        .filter(|(id, _)| id.is_none_or(|id| !ctx.departments.iter().any(|d| d.id == id)))
        .map(|(_, n)| n)
        .sum();
    if unassigned > 0 {
        lines.push(format!("- No department: {}", unassigned));
    }
    let total = ctx.employees.len();
    let summary = format!("There {} {} employee{}.", if total == 1 { "is" } else { "are" }, total, if total == 1 { "" } else { "s" });
    if lines.is_empty() {
        summary
    } else {
        format!("{}\n{}", summary, lines.join("\n"))
    }
}

fn department(ctx: &QueryContext<'_>, text: &str) -> String {
    if let Some(dept) = mentioned_department(text, ctx.departments) {
        let filter = EmployeeFilter::in_department(dept.id);
        let members: Vec<&Employee> = ctx.employees.iter().filter(|e| filter.matches(e)).collect();
        if members.is_empty() {
            return format!("No employees are in {}.", dept.name);
        }
        let lines: Vec<String> = members
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} ({})", i + 1, e.name, e.job_title))
            .collect();
        return format!("{} ({} employees):\n{}", dept.name, members.len(), lines.join("\n"));
    }

    if ctx.departments.is_empty() {
        return "No departments are on record.".to_string();
    }
    let lines: Vec<String> = ctx
        .departments
        .iter()
        .map(|d| {
            let count = ctx.employees.iter().filter(|e| e.department_id == Some(d.id)).count();
            format!("- {}: {} employees", d.name, count)
        })
        .collect();
    format!("Departments:\n{}", lines.join("\n"))
}

fn profile(ctx: &QueryContext<'_>, text: &str) -> String {
    match resolve_employee(text, ctx.employees) {
        NameMatch::Unique(e) => {
            let manager = e
                .manager_id
                .and_then(|id| ctx.employee(id))
                .map_or(NOT_AVAILABLE, |m| m.name.as_str());
            [
                e.name.clone(),
                format!("Job title: {}", e.job_title),
                format!("Department: {}", ctx.department_name(e.department_id)),
                format!("Manager: {}", manager),
                format!("Email: {}", e.email),
                format!("Hire date: {}", e.hire_date),
                format!("Employment: {}, {}", e.employment_type.label(), e.status.label()),
                format!("Work arrangement: {}", e.work_arrangement.label()),
                format!("Location: {}", e.location.as_deref().unwrap_or(NOT_AVAILABLE)),
            ]
            .join("\n")
        }
        NameMatch::Ambiguous(candidates) => clarification(&candidates),
        NameMatch::NoMatch => directory(ctx),
    }
}

fn directory(ctx: &QueryContext<'_>) -> String {
    if ctx.employees.is_empty() {
        return "There are no employees on record.".to_string();
    }
    let lines: Vec<String> = ctx
        .employees
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}. {} ({}, {})",
                i + 1,
                e.name,
                e.job_title,
                ctx.department_name(e.department_id)
            )
        })
        .collect();
    format!("Employee directory ({}):\n{}", ctx.employees.len(), lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{LeaveType, NewAttendance, NewLeaveRequest};
    use crate::store::{EmployeeFilter, MemoryStore, seed_demo_data};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 14, 10, 0, 0).unwrap()
    }

    async fn seeded() -> (MemoryStore, Vec<Employee>, Vec<Department>) {
        let store = MemoryStore::with_clock(Arc::new(FixedClock::new(now())));
        seed_demo_data(&store, "hash").await.unwrap();
        let employees = store.employees(&EmployeeFilter::default()).await.unwrap();
        let departments = store.departments().await.unwrap();
        (store, employees, departments)
    }

    async fn ask(store: &MemoryStore, employees: &[Employee], departments: &[Department], caller: Option<u64>, text: &str) -> String {
        let caller = caller.and_then(|id| employees.iter().find(|e| e.id == id));
        let ctx = QueryContext {
            store,
            now: now(),
            caller,
            employees,
            departments,
            top_arrivals: 5,
        };
        answer(&ctx, text, &mut ChatTrace::new()).await.unwrap()
    }

    async fn clock_in(store: &MemoryStore, employee_id: u64, hour: u32, minute: u32) {
        store
            .create_attendance(NewAttendance {
                employee_id,
                date: date(2025, 10, 14),
                clock_in: Utc.with_ymd_and_hms(2025, 10, 14, hour, minute, 0).unwrap(),
                location: None,
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_detect_order() {
        let no_depts: &[Department] = &[];
        let nobody: &[Employee] = &[];
        assert_eq!(Query::detect("who hasn't clocked in today?", no_depts, nobody), Query::NotClockedIn);
        assert_eq!(Query::detect("who arrived earliest?", no_depts, nobody), Query::EarliestArrival);
        assert_eq!(Query::detect("who came in last", no_depts, nobody), Query::LatestArrival);
        assert_eq!(Query::detect("latest leave requests", no_depts, nobody), Query::LeaveRequests(None));
        assert_eq!(Query::detect("show attendance", no_depts, nobody), Query::AttendanceToday);
        assert_eq!(Query::detect("who is on leave this month", no_depts, nobody), Query::OnLeave { this_month: true });
        assert_eq!(Query::detect("leave in december", no_depts, nobody), Query::LeaveByMonth(12));
        assert_eq!(Query::detect("pending leave requests", no_depts, nobody), Query::LeaveRequests(Some(LeaveStatus::Pending)));
        assert_eq!(Query::detect("who has the longest tenure", no_depts, nobody), Query::Tenure);
        assert_eq!(Query::detect("employee salaries", no_depts, nobody), Query::Salary);
        assert_eq!(Query::detect("who is my manager", no_depts, nobody), Query::OrgStructure);
        assert_eq!(Query::detect("how many employees", no_depts, nobody), Query::Headcount);
        assert_eq!(Query::detect("list departments", no_depts, nobody), Query::Department);
        assert_eq!(Query::detect("show employees", no_depts, nobody), Query::Directory);
    }

    #[test]
    fn test_who_is_in_a_department_is_a_roster() {
        let departments = [Department {
            id: 3,
            name: "Sales".to_string(),
            parent_id: None,
        }];
        let nobody: &[Employee] = &[];
        assert_eq!(Query::detect("who is in sales?", &departments, nobody), Query::Department);
        assert_eq!(Query::detect("who's in sales", &departments, nobody), Query::Department);
        assert_eq!(Query::detect("who is in today?", &departments, nobody), Query::AttendanceToday);
        assert_eq!(Query::detect("who clocked in from sales", &departments, nobody), Query::AttendanceToday);
    }

    #[tokio::test]
    async fn test_who_is_in_sales_lists_members() {
        let (store, employees, departments) = seeded().await;
        let text = ask(&store, &employees, &departments, Some(4), "who is in sales?").await;
        assert!(text.starts_with("Sales (3 employees):"), "{}", text);
        assert!(text.contains("Emma Davis (Sales Director)"));
    }

    #[test]
    fn test_may_needs_a_preposition() {
        assert_eq!(mentioned_month("leave in may"), Some(5));
        assert_eq!(mentioned_month("may i see the leave list"), None);
        assert_eq!(mentioned_month("leave during october?"), Some(10));
    }

    #[test]
    fn test_tenure_ranking_uses_days_over_365_25() {
        let today = date(2025, 10, 14);
        // 2099 days and 1347 days.
        assert_eq!(tenure_years(date(2020, 1, 15), today).round_dp(2), Decimal::new(575, 2));
        assert_eq!(tenure_years(date(2022, 2, 5), today).round_dp(2), Decimal::new(369, 2));
    }

    #[tokio::test]
    async fn test_tenure_ranking_orders_longest_first() {
        let (_, employees, _) = seeded().await;
        let subset: Vec<Employee> = employees
            .into_iter()
            .filter(|e| e.name == "David Brown" || e.name == "Alice Johnson")
            .collect();
        let text = tenure_ranking(&subset, date(2025, 10, 14));
        assert_eq!(
            text,
            "Employees by tenure as of 2025-10-14:\n\
             1. Alice Johnson: 5.75 years (hired 2020-01-15)\n\
             2. David Brown: 3.69 years (hired 2022-02-05)"
        );
    }

    #[tokio::test]
    async fn test_not_clocked_in_is_a_set_difference() {
        let (store, employees, departments) = seeded().await;
        for id in 2..=10 {
            clock_in(&store, id, 9, 0).await;
        }
        let text = ask(&store, &employees, &departments, None, "who hasn't clocked in today?").await;
        assert_eq!(
            text,
            "1 employee(s) haven't clocked in today (2025-10-14):\n1. Alice Johnson (Senior Software Engineer)"
        );
    }

    #[tokio::test]
    async fn test_earliest_and_latest_arrivals() {
        let (store, employees, departments) = seeded().await;
        clock_in(&store, 2, 9, 15).await;
        clock_in(&store, 5, 8, 5).await;
        clock_in(&store, 3, 8, 40).await;

        let earliest = ask(&store, &employees, &departments, None, "who arrived earliest today?").await;
        assert!(earliest.starts_with("Earliest arrivals today (2025-10-14):\n1. Emma Davis at 08:05 UTC\n2. Carol White"));

        let latest = ask(&store, &employees, &departments, None, "who was the latest to arrive").await;
        assert!(latest.contains("1. Bob Smith at 09:15 UTC"));
    }

    #[tokio::test]
    async fn test_empty_attendance_renders_sentence() {
        let (store, employees, departments) = seeded().await;
        assert_eq!(
            ask(&store, &employees, &departments, None, "who arrived earliest").await,
            "No one has clocked in today (2025-10-14) yet."
        );
        assert_eq!(
            ask(&store, &employees, &departments, None, "show attendance").await,
            "No attendance has been recorded today (2025-10-14)."
        );
    }

    #[tokio::test]
    async fn test_on_leave_boundaries_are_inclusive() {
        let (store, _, _) = seeded().await;
        let request = store
            .create_leave_request(NewLeaveRequest {
                employee_id: 6,
                leave_type: LeaveType::Vacation,
                start_date: date(2025, 10, 10),
                end_date: date(2025, 10, 20),
            })
            .await
            .unwrap();
        store.set_leave_status(request.id, LeaveStatus::Approved).await.unwrap();
        let approved = store.leave_requests(&LeaveFilter::default()).await.unwrap();

        assert_eq!(on_leave_on(&approved, date(2025, 10, 15)).len(), 1);
        assert_eq!(on_leave_on(&approved, date(2025, 10, 20)).len(), 1);
        assert!(on_leave_on(&approved, date(2025, 10, 21)).is_empty());
    }

    #[tokio::test]
    async fn test_pending_leave_is_not_on_leave() {
        let (store, employees, departments) = seeded().await;
        store
            .create_leave_request(NewLeaveRequest {
                employee_id: 6,
                leave_type: LeaveType::Vacation,
                start_date: date(2025, 10, 10),
                end_date: date(2025, 10, 20),
            })
            .await
            .unwrap();
        assert_eq!(
            ask(&store, &employees, &departments, None, "who is on leave").await,
            "No one is on approved leave today (2025-10-14)."
        );
        let pending = ask(&store, &employees, &departments, None, "any pending leave requests?").await;
        assert_eq!(
            pending,
            "Pending leave requests:\n- Frank Wilson: Vacation, 2025-10-10 to 2025-10-20 (11 days)"
        );
    }

    #[tokio::test]
    async fn test_org_structure_for_named_and_top_level() {
        let (store, employees, departments) = seeded().await;
        let alice = ask(&store, &employees, &departments, None, "who reports to alice johnson?").await;
        assert_eq!(
            alice,
            "Alice Johnson (Senior Software Engineer, Engineering)\n\
             Manager: none (top level)\n\
             Direct reports: Bob Smith, Grace Lee, Jack Anderson"
        );

        let bob = ask(&store, &employees, &departments, None, "who is bob's manager").await;
        assert!(bob.contains("Manager: Alice Johnson (Senior Software Engineer)"));
        assert!(bob.ends_with("Direct reports: none"));
    }

    #[tokio::test]
    async fn test_my_manager_uses_caller() {
        let (store, employees, departments) = seeded().await;
        let text = ask(&store, &employees, &departments, Some(4), "who is my manager?").await;
        assert!(text.starts_with("David Brown"));
        assert!(text.contains("Manager: Carol White"));
    }

    #[tokio::test]
    async fn test_salary_with_and_without_base() {
        let (store, employees, departments) = seeded().await;
        let alice = ask(&store, &employees, &departments, None, "what is alice's salary").await;
        assert!(alice.starts_with("Salary for Alice Johnson:\n- Base salary: 95000.00 USD (annually)"));
        assert!(alice.contains("Base Salary: 95000.00 USD (Monthly), effective 2024-01-01"));

        let frank = ask(&store, &employees, &departments, None, "frank salary").await;
        assert!(frank.contains("- Base salary: N/A"));
        assert!(frank.contains("No salary components on record."));
    }

    #[tokio::test]
    async fn test_headcount_and_departments() {
        let (store, employees, departments) = seeded().await;
        assert_eq!(
            ask(&store, &employees, &departments, None, "how many people work here").await,
            "There are 10 employees.\n- Engineering: 4\n- Human Resources: 3\n- Sales: 3"
        );
        let sales = ask(&store, &employees, &departments, None, "who works in sales").await;
        assert!(sales.starts_with("Sales (3 employees):\n1. Emma Davis (Sales Director)"));
    }

    #[tokio::test]
    async fn test_profile_and_ambiguity() {
        let (store, mut employees, departments) = seeded().await;
        let grace = ask(&store, &employees, &departments, None, "tell me about grace").await;
        assert!(grace.starts_with("Grace Lee\nJob title: DevOps Engineer\nDepartment: Engineering\nManager: Alice Johnson"));
        assert!(grace.contains("Location: N/A"));

        let mut twin = employees[6].clone();
        twin.id = 99;
        twin.name = "Grace Park".to_string();
        employees.push(twin);
        let ambiguous = ask(&store, &employees, &departments, None, "tell me about grace").await;
        assert!(ambiguous.starts_with("I found more than one matching employee"));
    }
}
