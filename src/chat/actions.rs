//! Action handlers: attendance and leave writes triggered from chat.
//!
//! Business-rule refusals (nothing to clock out, not your report, no dates
//! given) come back as `Ok` text so the conversation can continue. Only
//! store failures are errors.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{HcmError, HcmResult};
use crate::models::{Attendance, AttendanceFilter, Employee, NewAttendance, NewLeaveRequest};
use crate::store::{EmployeeFilter, EntityStore};

use super::dates::LeaveDraft;
use super::intent::contains_any;
use super::names::{NameMatch, clarification, resolve_employee};
use super::trace::ChatTrace;

/// Which way a delegated attendance record goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceDirection {
    /// Open a session.
    In,
    /// Close the open session.
    Out,
}

impl AttendanceDirection {
    /// Clock-out wording anywhere in `text` means `Out`; otherwise `In`.
    pub fn from_text(text: &str) -> Self {
        const OUT: &[&str] = &["clock out", "clock-out", "clocking out", "check out", "checking out", "clocked out"];
        if contains_any(text, OUT) {
            AttendanceDirection::Out
        } else {
            AttendanceDirection::In
        }
    }
}

/// Whose attendance is being recorded, for wording replies.
#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Caller,
    Report(&'a str),
}

impl Subject<'_> {
    fn name(&self) -> &str {
        match self {
            Subject::Caller => "You",
            Subject::Report(name) => name,
        }
    }

    fn pronoun(&self) -> &'static str {
        match self {
            Subject::Caller => "You",
            Subject::Report(_) => "They",
        }
    }
}

fn hhmm(instant: DateTime<Utc>) -> String {
    instant.format("%H:%M UTC").to_string()
}

fn already_clocked_in(record: &Attendance, subject: Subject<'_>) -> String {
    let follow_up = match record.clock_out {
        Some(out) => format!("{} clocked out at {}.", subject.pronoun(), hhmm(out)),
        None => format!("{} haven't clocked out yet.", subject.pronoun()),
    };
    format!(
        "{} already clocked in today at {}. {}",
        subject.name(),
        hhmm(record.clock_in),
        follow_up
    )
}

async fn clock_in_employee(
    store: &dyn EntityStore,
    now: DateTime<Utc>,
    employee: &Employee,
    subject: Subject<'_>,
    trace: &mut ChatTrace,
) -> HcmResult<String> {
    let today = now.date_naive();
    let filter = AttendanceFilter::for_employee_on(employee.id, today);

    if let Some(record) = store.attendance(&filter).await?.first() {
        trace.step(format!("Found today's attendance record #{}; nothing written", record.id));
        return Ok(already_clocked_in(record, subject));
    }

    let input = NewAttendance {
        employee_id: employee.id,
        date: today,
        clock_in: now,
        location: None,
    };
    match store.create_attendance(input).await {
        Ok(record) => {
            trace.step(format!("Created attendance record #{}", record.id));
            debug!(employee_id = employee.id, attendance_id = record.id, "Clocked in");
            Ok(match subject {
                Subject::Caller => format!("Clocked in at {} on {}. Have a great day!", hhmm(now), today),
                Subject::Report(name) => format!("Clocked in {} at {} on {}.", name, hhmm(now), today),
            })
        }
        Err(HcmError::Conflict { .. }) => {
            // A concurrent request opened the session first.
            trace.step("Concurrent clock-in detected; re-reading today's record");
            let records = store.attendance(&filter).await?;
            let record = records.first().ok_or_else(|| HcmError::Store {
                message: format!(
                    "attendance conflict for employee {} but no record found",
                    employee.id
                ),
            })?;
            Ok(already_clocked_in(record, subject))
        }
        Err(err) => Err(err),
    }
}

async fn clock_out_employee(
    store: &dyn EntityStore,
    now: DateTime<Utc>,
    employee: &Employee,
    subject: Subject<'_>,
    trace: &mut ChatTrace,
) -> HcmResult<String> {
    let today = now.date_naive();
    let open = AttendanceFilter::for_employee_on(employee.id, today).open();

    let Some(mut record) = store.attendance(&open).await?.into_iter().next() else {
        trace.step("No open attendance record today; nothing written");
        return Ok(match subject {
            Subject::Caller => "You haven't clocked in today. Please clock in first.".to_string(),
            Subject::Report(name) => format!(
                "{} hasn't clocked in today, so there is nothing to clock out. Clock them in first.",
                name
            ),
        });
    };

    record.clock_out = Some(now);
    let worked = record.worked().unwrap_or_default();
    let record_id = record.id;
    store.save_attendance(record).await?;
    trace.step(format!("Closed attendance record #{}", record_id));
    debug!(employee_id = employee.id, attendance_id = record_id, "Clocked out");

    Ok(match subject {
        Subject::Caller => format!("Clocked out at {}. You worked {} today.", hhmm(now), worked),
        Subject::Report(name) => format!("Clocked out {} at {}. They worked {} today.", name, hhmm(now), worked),
    })
}

/// Opens a session for the caller, or reports the one already recorded
/// today.
pub async fn clock_in(
    store: &dyn EntityStore,
    now: DateTime<Utc>,
    caller: &Employee,
    trace: &mut ChatTrace,
) -> HcmResult<String> {
    clock_in_employee(store, now, caller, Subject::Caller, trace).await
}

/// Closes the caller's open session for today.
pub async fn clock_out(
    store: &dyn EntityStore,
    now: DateTime<Utc>,
    caller: &Employee,
    trace: &mut ChatTrace,
) -> HcmResult<String> {
    clock_out_employee(store, now, caller, Subject::Caller, trace).await
}

/// Clocks a named direct report in or out on the caller's behalf.
///
/// The caller must manage at least one person, the message must name
/// exactly one employee, and that employee must report directly to the
/// caller.
pub async fn record_for_report(
    store: &dyn EntityStore,
    now: DateTime<Utc>,
    caller: &Employee,
    text: &str,
    trace: &mut ChatTrace,
) -> HcmResult<String> {
    let reports = store.employees(&EmployeeFilter::reports_of(caller.id)).await?;
    if reports.is_empty() {
        trace.step("Caller has no direct reports; refused");
        return Ok("You don't have any direct reports, so you can't record attendance for other employees.".to_string());
    }
    trace.step(format!("Caller manages {} direct report(s)", reports.len()));

    let others: Vec<Employee> = store
        .employees(&EmployeeFilter::default())
        .await?
        .into_iter()
        .filter(|e| e.id != caller.id)
        .collect();
    let target = match resolve_employee(text, &others) {
        NameMatch::Unique(target) => target,
        NameMatch::Ambiguous(candidates) => {
            trace.step(format!("{} employees match the name; asking to clarify", candidates.len()));
            return Ok(clarification(&candidates));
        }
        NameMatch::NoMatch => {
            trace.step("No employee named in the message");
            return Ok("I couldn't tell who you mean. Try \"clock in for <full name>\" with the name of one of your direct reports.".to_string());
        }
    };

    if target.manager_id != Some(caller.id) {
        trace.step(format!("Employee #{} does not report to the caller; refused", target.id));
        return Ok(format!(
            "{} is not one of your direct reports. You can only record attendance for your own team.",
            target.name
        ));
    }

    let subject = Subject::Report(&target.name);
    match AttendanceDirection::from_text(text) {
        AttendanceDirection::In => clock_in_employee(store, now, target, subject, trace).await,
        AttendanceDirection::Out => clock_out_employee(store, now, target, subject, trace).await,
    }
}

/// Files a pending leave request for the caller from the dates and leave
/// type found in the message.
pub async fn request_leave(
    store: &dyn EntityStore,
    now: DateTime<Utc>,
    caller: &Employee,
    text: &str,
    trace: &mut ChatTrace,
) -> HcmResult<String> {
    let Some(draft) = LeaveDraft::parse(text, now.date_naive()) else {
        trace.step("No dates found in the message; asking for them");
        return Ok("When would you like to take leave? Give dates as YYYY-MM-DD, or say today, tomorrow or next week.".to_string());
    };
    trace.step(format!(
        "Parsed {} from {} to {}",
        draft.leave_type, draft.start_date, draft.end_date
    ));
    if draft.is_reversed() {
        trace.step("End date is before start date; nothing written");
        return Ok(format!(
            "The end date {} is before the start date {}. Please give the first day of leave first.",
            draft.end_date, draft.start_date
        ));
    }

    let request = store
        .create_leave_request(NewLeaveRequest {
            employee_id: caller.id,
            leave_type: draft.leave_type,
            start_date: draft.start_date,
            end_date: draft.end_date,
        })
        .await?;
    trace.step(format!("Created leave request #{}", request.id));

    let days = request.day_count();
    Ok(format!(
        "Leave request submitted: {} from {} to {} ({} day{}). Status: {}. Your manager will review it.",
        request.leave_type,
        request.start_date,
        request.end_date,
        days,
        if days == 1 { "" } else { "s" },
        request.status
    ))
}
