//! Core data models for the HCM assistant.
//!
//! This module contains the HR entities read and written through the
//! entity store.

mod attendance;
mod employee;
mod leave;
mod salary;
mod setting;
mod user;

pub use attendance::{Attendance, AttendanceFilter, NewAttendance, WorkedTime};
pub use employee::{
    Department, Employee, EmployeeDetails, EmployeeUpdate, EmploymentStatus, EmploymentType,
    NewEmployee, WorkArrangement, check_reporting_line,
};
pub use leave::{LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest, leave_day_count};
pub use salary::{
    DEFAULT_COMPONENT_FREQUENCY, DEFAULT_CURRENCY, DEFAULT_EMPLOYEE_PAY_FREQUENCY, SalaryComponent,
};
pub use setting::{Feedback, NewFeedback, Setting};
pub use user::{NewUser, User};
