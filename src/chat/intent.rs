//! Intent classification.
//!
//! A message is matched against [`ROUTES`], an ordered table of
//! `(Intent, predicate)` rows. The first row whose predicate accepts the
//! lower-cased message wins; nothing matching falls through to
//! [`Intent::General`]. Row order is the precedence contract.
//!
//! The employee-data row is the privacy boundary: anything it accepts is
//! answered locally and never reaches the language model. Besides its
//! keyword list it consults a [`Lexicon`] of department names and employee
//! name tokens, so a message naming a person or department stays local even
//! without any HR keyword.

use std::fmt;

use serde::Serialize;

use crate::models::{Department, Employee};

/// The handling strategy chosen for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Open an attendance session for the caller.
    ClockIn,
    /// Close the caller's open attendance session.
    ClockOut,
    /// A manager clocks a direct report in or out.
    RecordForReport,
    /// File a leave request for the caller.
    LeaveRequest,
    /// Static help on where things are in the app.
    Navigation,
    /// Questions answered from employee records. Never forwarded.
    EmployeeData,
    /// Anything else; forwarded to the language model with aggregate
    /// context only.
    General,
}

impl Intent {
    /// Stable name used in logs and traces.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::ClockIn => "clock_in",
            Intent::ClockOut => "clock_out",
            Intent::RecordForReport => "record_for_report",
            Intent::LeaveRequest => "leave_request",
            Intent::Navigation => "navigation",
            Intent::EmployeeData => "employee_data",
            Intent::General => "general",
        }
    }

    /// Returns true if handling the intent needs a verified caller.
    pub fn requires_identity(&self) -> bool {
        !matches!(self, Intent::Navigation | Intent::General)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Department names and employee name tokens known to the store, all
/// lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    terms: Vec<String>,
    names: Vec<String>,
}

impl Lexicon {
    /// Builds a lexicon from store records. Employee names contribute every
    /// token longer than two characters.
    pub fn from_records(departments: &[Department], employees: &[Employee]) -> Self {
        let mut names: Vec<String> = employees.iter().flat_map(Employee::name_tokens).collect();
        names.sort();
        names.dedup();
        let mut terms: Vec<String> = departments
            .iter()
            .map(|d| d.name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .chain(names.iter().cloned())
            .collect();
        terms.sort();
        terms.dedup();
        Self { terms, names }
    }

    /// Returns true if `word` is exactly one of the employee name tokens.
    pub fn is_name(&self, word: &str) -> bool {
        self.names.binary_search_by(|name| name.as_str().cmp(word)).is_ok()
    }

    /// Returns true if any known term occurs in `text` (already lower-cased).
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.terms.iter().any(|term| text.contains(term.as_str()))
    }
}

/// A routing row test over the lower-cased message.
pub type Predicate = fn(&str, &Lexicon) -> bool;

/// The routing table, in precedence order.
pub const ROUTES: [(Intent, Predicate); 6] = [
    (Intent::ClockIn, is_clock_in),
    (Intent::ClockOut, is_clock_out),
    (Intent::RecordForReport, is_record_for_report),
    (Intent::LeaveRequest, is_leave_request),
    (Intent::Navigation, is_navigation),
    (Intent::EmployeeData, is_employee_data),
];

/// Classifies a message. Matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use hcm_assistant::chat::{Intent, Lexicon, classify};
///
/// let lexicon = Lexicon::default();
/// assert_eq!(classify("Clock me in please", &lexicon), Intent::ClockIn);
/// assert_eq!(classify("Who reports to Carol?", &lexicon), Intent::EmployeeData);
/// assert_eq!(classify("Tell me a joke", &lexicon), Intent::General);
/// ```
pub fn classify(message: &str, lexicon: &Lexicon) -> Intent {
    let text = normalize(message);
    ROUTES
        .iter()
        .find(|(_, predicate)| predicate(&text, lexicon))
        .map_or(Intent::General, |(intent, _)| *intent)
}

/// Lower-cases and folds typographic apostrophes so "I’m" matches "i'm".
pub(crate) fn normalize(message: &str) -> String {
    message.trim().to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

pub(crate) fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

const INQUIRY_WORDS: &[&str] = &[
    "who", "whom", "whose", "which", "what", "when", "where", "why", "how", "list", "show",
    "did", "has", "have", "is", "are", "does", "do", "was", "were",
];

/// Returns true if the message reads as a question about something rather
/// than a request to do it.
fn is_inquiry(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .find(|word| !word.is_empty())
        .is_some_and(|first| INQUIRY_WORDS.contains(&first))
}

const CLOCK_IN_PHRASES: &[&str] = &[
    "clock in", "clock me in", "clocking in", "clock-in", "check in", "check me in",
    "checking in", "start work", "starting work", "start my shift", "starting my shift",
    "i'm here", "im here", "i am here", "i've arrived", "i have arrived", "just arrived",
    "i'm present", "mark me present",
];

/// Single-word clock-in triggers, matched as whole words so "presentation"
/// does not count.
const CLOCK_IN_WORDS: &[&str] = &["arrived", "present"];

const CLOCK_OUT_PHRASES: &[&str] = &[
    "clock out", "clock me out", "clocking out", "clock-out", "check out", "check me out",
    "checking out", "end work", "ending work", "end my shift", "finish work", "finishing work",
    "leaving for the day", "heading home", "done for the day", "i'm leaving", "signing off",
];

const DELEGATED_PREFIXES: &[&str] = &[
    "clock in for ", "clock out for ", "check in for ", "check out for ", "clock-in for ",
    "clock-out for ",
];

/// Returns true for "clock in for <employee name>" phrasing.
fn is_delegated(text: &str, lexicon: &Lexicon) -> bool {
    DELEGATED_PREFIXES.iter().any(|prefix| {
        text.match_indices(prefix).any(|(at, _)| {
            text[at + prefix.len()..]
                .split(|c: char| !c.is_alphanumeric())
                .find(|word| !word.is_empty())
                .is_some_and(|word| lexicon.is_name(word))
        })
    })
}

fn is_clock_in(text: &str, lexicon: &Lexicon) -> bool {
    let triggered = contains_any(text, CLOCK_IN_PHRASES)
        || text
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| CLOCK_IN_WORDS.contains(&word));
    triggered && !is_inquiry(text) && !is_delegated(text, lexicon)
}

fn is_clock_out(text: &str, lexicon: &Lexicon) -> bool {
    contains_any(text, CLOCK_OUT_PHRASES) && !is_inquiry(text) && !is_delegated(text, lexicon)
}

fn is_record_for_report(text: &str, lexicon: &Lexicon) -> bool {
    (contains_any(text, &["record attendance", "mark attendance", "log attendance"])
        || is_delegated(text, lexicon))
        && !is_inquiry(text)
}

const LEAVE_PHRASES: &[&str] = &[
    "request leave", "apply for leave", "take leave", "taking leave", "book leave",
    "time off", "day off", "days off", "request vacation", "book a vacation",
    "take a vacation", "sick day", "calling in sick", "call in sick", "off sick",
    "request sick leave", "need leave",
];

fn is_leave_request(text: &str, _: &Lexicon) -> bool {
    contains_any(text, LEAVE_PHRASES) && !is_inquiry(text)
}

const NAVIGATION_PHRASES: &[&str] = &[
    "how do i", "how can i", "where can i", "where do i", "where is the", "how to ",
    "organization chart", "organisation chart", "org chart", "edit employee",
    "add employee", "add an employee", "add a new employee", "which page", "navigate",
    "what can you do",
];

fn is_navigation(text: &str, _: &Lexicon) -> bool {
    text == "help" || contains_any(text, NAVIGATION_PHRASES)
}

const EMPLOYEE_DATA_PHRASES: &[&str] = &[
    "employee", "staff", "salary", "salaries", "pay", "compensation", "wage", "bonus",
    "attendance", "clocked in", "checked in", "arrived", "arrival", "absent", "on leave",
    "leave request", "pending leave", "reports to", "direct report", "manager", "managed by",
    "team", "department", "hired", "hire date", "tenure", "longest", "seniority", "headcount",
    "how many people", "who is", "who's", "who works", "works in", "email", "e-mail",
    "job title", "profile", "directory", "colleague", "coworker", "co-worker", "people",
    "person", "everyone", "org structure", "reporting line",
];

fn is_employee_data(text: &str, lexicon: &Lexicon) -> bool {
    contains_any(text, EMPLOYEE_DATA_PHRASES) || lexicon.mentioned_in(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn employee(id: u64, name: &str) -> Employee {
        let now = Utc.with_ymd_and_hms(2025, 10, 14, 9, 0, 0).unwrap();
        Employee {
            id,
            user_id: None,
            name: name.to_string(),
            email: String::new(),
            job_title: String::new(),
            department_id: None,
            manager_id: None,
            hire_date: now.date_naive(),
            employment_type: Default::default(),
            status: Default::default(),
            location: None,
            work_arrangement: Default::default(),
            base_salary: None,
            currency: None,
            pay_frequency: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn lexicon() -> Lexicon {
        Lexicon::from_records(
            &[Department {
                id: 3,
                name: "Sales".to_string(),
                parent_id: None,
            }],
            &[employee(1, "Alice Johnson"), employee(2, "Bob Smith")],
        )
    }

    #[test]
    fn test_self_service_actions() {
        let lexicon = lexicon();
        assert_eq!(classify("Please clock me in", &lexicon), Intent::ClockIn);
        assert_eq!(classify("I’m here!", &lexicon), Intent::ClockIn);
        assert_eq!(classify("clock in for the day", &lexicon), Intent::ClockIn);
        assert_eq!(classify("Clock out", &lexicon), Intent::ClockOut);
        assert_eq!(classify("done for the day, bye", &lexicon), Intent::ClockOut);
        assert_eq!(classify("I need time off tomorrow", &lexicon), Intent::LeaveRequest);
    }

    #[test]
    fn test_delegated_attendance_reaches_record_row() {
        let lexicon = lexicon();
        assert_eq!(classify("clock in for Bob", &lexicon), Intent::RecordForReport);
        assert_eq!(classify("Clock out for Bob Smith", &lexicon), Intent::RecordForReport);
        assert_eq!(classify("record attendance for bob", &lexicon), Intent::RecordForReport);
    }

    #[test]
    fn test_bare_arrival_words_clock_in() {
        let lexicon = lexicon();
        assert_eq!(classify("I arrived", &lexicon), Intent::ClockIn);
        assert_eq!(classify("Present!", &lexicon), Intent::ClockIn);
        assert_eq!(classify("who arrived earliest?", &lexicon), Intent::EmployeeData);
        assert_eq!(classify("Give me tips for my presentation", &lexicon), Intent::General);
    }

    #[test]
    fn test_clock_in_for_a_time_is_self_service() {
        let lexicon = lexicon();
        assert_eq!(classify("clock in for 9am shift", &lexicon), Intent::ClockIn);
        assert_eq!(classify("clock out for lunch", &lexicon), Intent::ClockOut);
        assert_eq!(classify("clock in for Bob", &Lexicon::default()), Intent::ClockIn);
        assert!(lexicon.is_name("bob"));
        assert!(!lexicon.is_name("sales"));
    }

    #[test]
    fn test_first_match_wins() {
        let lexicon = lexicon();
        // Clock-in outranks leave.
        assert_eq!(
            classify("check in now and request leave for friday", &lexicon),
            Intent::ClockIn
        );
        // Navigation outranks employee data.
        assert_eq!(
            classify("How do I edit employee salary?", &lexicon),
            Intent::Navigation
        );
    }

    #[test]
    fn test_inquiries_do_not_trigger_actions() {
        let lexicon = lexicon();
        assert_eq!(classify("Who hasn't clocked in today?", &lexicon), Intent::EmployeeData);
        assert_eq!(classify("how do I request leave?", &lexicon), Intent::Navigation);
        assert_eq!(classify("Did Bob check in today?", &lexicon), Intent::EmployeeData);
        assert_eq!(
            classify("how do i record attendance for my team", &lexicon),
            Intent::Navigation
        );
    }

    #[test]
    fn test_lexicon_keeps_named_people_local() {
        let lexicon = lexicon();
        assert_eq!(classify("Tell me about Alice", &lexicon), Intent::EmployeeData);
        assert_eq!(classify("what does sales do all day", &lexicon), Intent::EmployeeData);
        assert_eq!(classify("Tell me about Alice", &Lexicon::default()), Intent::General);
    }

    #[test]
    fn test_general_fallback() {
        let lexicon = lexicon();
        assert_eq!(classify("What's the weather like?", &lexicon), Intent::General);
        assert_eq!(classify("summarize the leave policy", &lexicon), Intent::General);
    }

    #[test]
    fn test_identity_requirements() {
        assert!(Intent::ClockIn.requires_identity());
        assert!(Intent::EmployeeData.requires_identity());
        assert!(!Intent::Navigation.requires_identity());
        assert!(!Intent::General.requires_identity());
    }
}
