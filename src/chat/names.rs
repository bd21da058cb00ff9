//! Resolving the employee a message refers to.

use crate::models::Employee;

/// Outcome of looking for a person in a message.
#[derive(Debug, Clone, PartialEq)]
pub enum NameMatch<'a> {
    /// Exactly one employee fits.
    Unique(&'a Employee),
    /// Several employees fit equally well; the caller must disambiguate.
    Ambiguous(Vec<&'a Employee>),
    /// Nobody is named.
    NoMatch,
}

/// Finds the employee named in `text` (already lower-cased).
///
/// An employee whose full name appears verbatim beats token matches. Failing
/// that, any employee with a name token longer than two characters inside
/// the message is a candidate. A single candidate is a match; several are
/// reported as ambiguous in store order rather than picking the first.
///
/// # Examples
///
/// ```
/// # use hcm_assistant::chat::{NameMatch, resolve_employee};
/// # use hcm_assistant::models::Employee;
/// # fn employee(id: u64, name: &str) -> Employee {
/// #     let now = chrono::Utc::now();
/// #     Employee { id, user_id: None, name: name.to_string(), email: String::new(),
/// #         job_title: String::new(), department_id: None, manager_id: None,
/// #         hire_date: now.date_naive(), employment_type: Default::default(),
/// #         status: Default::default(), location: None, work_arrangement: Default::default(),
/// #         base_salary: None, currency: None, pay_frequency: None,
/// #         created_at: now, updated_at: now, deleted_at: None }
/// # }
/// let staff = vec![employee(1, "Grace Lee"), employee(2, "Grace Park")];
///
/// assert!(matches!(resolve_employee("who manages grace lee?", &staff), NameMatch::Unique(e) if e.id == 1));
/// assert!(matches!(resolve_employee("who manages grace?", &staff), NameMatch::Ambiguous(c) if c.len() == 2));
/// assert_eq!(resolve_employee("who manages tom?", &staff), NameMatch::NoMatch);
/// ```
pub fn resolve_employee<'a>(text: &str, employees: &'a [Employee]) -> NameMatch<'a> {
    let full: Vec<(&Employee, String)> = employees
        .iter()
        .map(|e| (e, e.name.trim().to_lowercase()))
        .filter(|(_, name)| !name.is_empty() && text.contains(name.as_str()))
        .collect();
    // "sam lee" inside "sam leeds" is not a separate mention.
    let longest: Vec<&Employee> = full
        .iter()
        .filter(|(e, name)| {
            !full
                .iter()
                .any(|(other, other_name)| other.id != e.id && other_name.len() > name.len() && other_name.contains(name.as_str()))
        })
        .map(|(e, _)| *e)
        .collect();
    if let Some(found) = single_or_ambiguous(longest) {
        return found;
    }

    let partial: Vec<&Employee> = employees
        .iter()
        .filter(|e| e.name_tokens().iter().any(|token| text.contains(token.as_str())))
        .collect();
    single_or_ambiguous(partial).unwrap_or(NameMatch::NoMatch)
}

fn single_or_ambiguous(mut candidates: Vec<&Employee>) -> Option<NameMatch<'_>> {
    match candidates.len() {
        0 => None,
        1 => candidates.pop().map(NameMatch::Unique),
        _ => Some(NameMatch::Ambiguous(candidates)),
    }
}

/// Sentence asking the caller which of several employees they meant.
pub fn clarification(candidates: &[&Employee]) -> String {
    let names: Vec<String> = candidates
        .iter()
        .map(|e| {
            if e.job_title.is_empty() {
                e.name.clone()
            } else {
                format!("{} ({})", e.name, e.job_title)
            }
        })
        .collect();
    format!(
        "I found more than one matching employee: {}. Which one did you mean? Please use their full name.",
        names.join(", ")
    )
}
