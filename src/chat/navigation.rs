//! Static help on where things live in the app.

/// Help topics, first match wins. Each entry is (keywords, answer).
const TOPICS: &[(&[&str], &str)] = &[
    (
        &["org chart", "organization chart", "organisation chart"],
        "Open Org Chart from the sidebar (/org-chart). It shows every employee under their manager; top-level employees sit at the root.",
    ),
    (
        &["add employee", "add an employee", "add a new employee", "new employee"],
        "Go to Employees (/employees) and press \"Add Employee\". Fill in name, e-mail, job title, department and manager, then save.",
    ),
    (
        &["edit employee", "update employee", "change employee"],
        "Go to Employees (/employees), find the person and press \"Edit\". A manager must be an existing employee other than the person being edited.",
    ),
    (
        &["leave", "vacation", "time off"],
        "Open Leave (/leave) to file a request or see your requests. You can also tell me, for example \"request leave tomorrow\" or \"time off 2025-11-03 to 2025-11-07\".",
    ),
    (
        &["attendance", "clock", "check in", "check out"],
        "Open Attendance (/attendance) to see sessions, or just tell me \"clock in\" or \"clock out\". Managers can say \"clock in for <name>\" for a direct report.",
    ),
    (
        &["salary", "payslip", "pay slip", "export"],
        "Open Salary (/salary) to export the salary sheet for the current month or generate a payslip for one employee.",
    ),
    (
        &["setting", "chatbot", "assistant"],
        "Open Settings (/settings) to edit the assistant's key/value settings, such as company name and tone.",
    ),
];

const GENERAL_HELP: &str = "I can help with:\n\
- Attendance: \"clock in\", \"clock out\", \"clock in for <name>\" (managers)\n\
- Leave: \"request leave tomorrow\", \"sick day 2025-11-03\"\n\
- People: \"who reports to Alice?\", \"who hasn't clocked in today?\", \"who is on leave?\"\n\
- Pages: Dashboard (/), Employees, Org Chart, Attendance, Leave, Salary and Settings in the sidebar.";

/// Help text for `text` (already lower-cased).
pub fn help(text: &str) -> &'static str {
    TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map_or(GENERAL_HELP, |(_, answer)| answer)
}
