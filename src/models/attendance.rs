//! Attendance model.
//!
//! One record per employee per work session. A session is open while
//! `clock_out` is `None`.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier.
    pub id: u64,
    /// The employee who worked the session.
    pub employee_id: u64,
    /// The calendar day of the session.
    pub date: NaiveDate,
    /// When the session started.
    pub clock_in: DateTime<Utc>,
    /// When the session ended; `None` while open.
    pub clock_out: Option<DateTime<Utc>>,
    /// Where the employee clocked in from.
    pub location: Option<String>,
}

impl Attendance {
    /// Returns true while the session has no clock-out.
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    /// Time worked, once the session is closed.
    pub fn worked(&self) -> Option<WorkedTime> {
        self.clock_out
            .map(|clock_out| WorkedTime::from_duration(clock_out - self.clock_in))
    }
}

/// Input for opening a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    /// The employee clocking in.
    pub employee_id: u64,
    /// The calendar day of the session.
    pub date: NaiveDate,
    /// The clock-in instant.
    pub clock_in: DateTime<Utc>,
    /// Optional location.
    pub location: Option<String>,
}

/// Attendance query. Empty fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    /// Only this employee.
    pub employee_id: Option<u64>,
    /// Only sessions on this day.
    pub date: Option<NaiveDate>,
    /// Only sessions without a clock-out.
    pub open_only: bool,
}

impl AttendanceFilter {
    /// Sessions of one employee on one day.
    pub fn for_employee_on(employee_id: u64, date: NaiveDate) -> Self {
        Self {
            employee_id: Some(employee_id),
            date: Some(date),
            open_only: false,
        }
    }

    /// Sessions of any employee on one day.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    /// Restricts the filter to open sessions.
    pub fn open(mut self) -> Self {
        self.open_only = true;
        self
    }

    /// Returns true if `record` passes the filter.
    pub fn matches(&self, record: &Attendance) -> bool {
        self.employee_id.is_none_or(|id| record.employee_id == id)
            && self.date.is_none_or(|date| record.date == date)
            && (!self.open_only || record.is_open())
    }
}

/// Whole hours and minutes worked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkedTime {
    /// Whole hours.
    pub hours: i64,
    /// Remaining minutes (0..60).
    pub minutes: i64,
}

impl WorkedTime {
    /// Splits a duration into hours and minutes, clamping negatives to zero.
    pub fn from_duration(duration: Duration) -> Self {
        let total = duration.num_minutes().max(0);
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

impl fmt::Display for WorkedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}
