//! Leave request model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HcmError, HcmResult};

/// Kind of leave being requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    /// Planned holiday.
    #[default]
    #[serde(alias = "vacation")]
    Vacation,
    /// Illness.
    #[serde(rename = "Sick Leave", alias = "sick", alias = "sick_leave")]
    SickLeave,
    /// Personal matters.
    #[serde(alias = "personal")]
    Personal,
    /// Unplanned emergency.
    #[serde(alias = "emergency")]
    Emergency,
}

impl LeaveType {
    /// Display label, as stored.
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Vacation => "Vacation",
            LeaveType::SickLeave => "Sick Leave",
            LeaveType::Personal => "Personal",
            LeaveType::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeaveType {
    type Err = HcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "vacation" | "annual" | "annual leave" => Ok(LeaveType::Vacation),
            "sick" | "sick leave" => Ok(LeaveType::SickLeave),
            "personal" | "personal leave" => Ok(LeaveType::Personal),
            "emergency" | "emergency leave" => Ok(LeaveType::Emergency),
            other => Err(HcmError::InvalidLeaveRequest {
                message: format!("unknown leave type '{}'", other),
            }),
        }
    }
}

/// Approval state of a leave request. New requests are always pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveStatus {
    /// Awaiting a decision.
    #[default]
    #[serde(alias = "pending")]
    Pending,
    /// Approved by HR.
    #[serde(alias = "approved")]
    Approved,
    /// Rejected by HR.
    #[serde(alias = "rejected")]
    Rejected,
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        })
    }
}

/// A request for time away from work over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier.
    pub id: u64,
    /// The requesting employee.
    pub employee_id: u64,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Approval state.
    pub status: LeaveStatus,
    /// When the request was filed.
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Number of calendar days covered, both ends included.
    pub fn day_count(&self) -> i64 {
        leave_day_count(self.start_date, self.end_date)
    }

    /// Returns true if `date` falls inside the leave, both ends included.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns true if the leave shares at least one day with `[from, to]`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && self.end_date >= from
    }
}

/// `(end - start in days) + 1`.
pub fn leave_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Input for filing a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaveRequest {
    /// The requesting employee.
    pub employee_id: u64,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
}

impl NewLeaveRequest {
    /// Rejects ranges that end before they start.
    pub fn validate(&self) -> HcmResult<()> {
        if self.end_date < self.start_date {
            return Err(HcmError::InvalidLeaveRequest {
                message: format!(
                    "end date {} is before start date {}",
                    self.end_date, self.start_date
                ),
            });
        }
        Ok(())
    }
}

/// Leave query. Empty fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    /// Only this employee's requests.
    pub employee_id: Option<u64>,
    /// Only requests in this state.
    pub status: Option<LeaveStatus>,
}

impl LeaveFilter {
    /// Requests in one state.
    pub fn with_status(status: LeaveStatus) -> Self {
        Self {
            employee_id: None,
            status: Some(status),
        }
    }

    /// Returns true if `request` passes the filter.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.employee_id.is_none_or(|id| request.employee_id == id)
            && self.status.is_none_or(|status| request.status == status)
    }
}
