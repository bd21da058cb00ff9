//! Fallback to the language model.
//!
//! Only aggregate company facts go into the prompt: the employee count and
//! department names. Operator settings are copied in verbatim. Earlier
//! turns are forwarded only when they were themselves general questions.

use crate::llm::{CompletionRequest, LlmMessage, Role};
use crate::models::{Department, Setting};

use super::intent::{Intent, Lexicon, classify};

const PREAMBLE: &str = "You are the HR assistant of this company's HCM system. \
Answer general questions about HR topics, policies and using the system. \
You have no access to individual employee records; if asked about a specific \
person, say that the chat can answer that directly when the question names them.";

/// Aggregate facts safe to share with an external model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanySnapshot {
    /// Number of visible employees.
    pub employee_count: usize,
    /// Department names, in store order.
    pub departments: Vec<String>,
}

impl CompanySnapshot {
    /// Counts employees and collects department names.
    pub fn new(employee_count: usize, departments: &[Department]) -> Self {
        Self {
            employee_count,
            departments: departments.iter().map(|d| d.name.clone()).collect(),
        }
    }
}

/// Preamble, then each setting as `key: value (description)`, then the
/// snapshot.
pub fn system_prompt(settings: &[Setting], snapshot: &CompanySnapshot) -> String {
    let mut prompt = String::from(PREAMBLE);
    if !settings.is_empty() {
        prompt.push_str("\n\nSettings:");
        for setting in settings {
            let line = if setting.description.is_empty() {
                format!("\n{}: {}", setting.key, setting.value)
            } else {
                format!("\n{}: {} ({})", setting.key, setting.value, setting.description)
            };
            prompt.push_str(&line);
        }
    }
    let departments = if snapshot.departments.is_empty() {
        "none".to_string()
    } else {
        snapshot.departments.join(", ")
    };
    prompt.push_str(&format!(
        "\n\nCompany overview:\nEmployees: {}\nDepartments: {}",
        snapshot.employee_count, departments
    ));
    prompt
}

/// Prior turns safe to forward: user turns that classify as
/// [`Intent::General`], newest `max_turns` kept, oldest first.
pub fn forwardable_history(history: &[LlmMessage], lexicon: &Lexicon, max_turns: usize) -> Vec<LlmMessage> {
    let kept: Vec<&LlmMessage> = history
        .iter()
        .filter(|m| m.role == Role::User && classify(&m.content, lexicon) == Intent::General)
        .collect();
    let skip = kept.len().saturating_sub(max_turns);
    kept.into_iter().skip(skip).cloned().collect()
}

/// Sampling parameters for delegated completions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    /// Temperature.
    pub temperature: f32,
    /// Token cap.
    pub max_tokens: u32,
}

/// Assembles the completion request for a general question.
pub fn completion_request(
    message: &str,
    history: Vec<LlmMessage>,
    settings: &[Setting],
    snapshot: &CompanySnapshot,
    sampling: Sampling,
) -> CompletionRequest {
    let mut messages = history;
    messages.push(LlmMessage::user(message));
    CompletionRequest {
        system_prompt: system_prompt(settings, snapshot),
        messages,
        temperature: sampling.temperature,
        max_tokens: sampling.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: &str, description: &str) -> Setting {
        Setting {
            key: key.to_string(),
            value: value.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_prompt_layout() {
        let snapshot = CompanySnapshot {
            employee_count: 10,
            departments: vec!["Engineering".to_string(), "Sales".to_string()],
        };
        let prompt = system_prompt(
            &[setting("company_name", "Acme Corp", "Company name"), setting("tone", "warm", "")],
            &snapshot,
        );
        assert!(prompt.starts_with(PREAMBLE));
        assert!(prompt.contains("\n\nSettings:\ncompany_name: Acme Corp (Company name)\ntone: warm\n\n"));
        assert!(prompt.ends_with("Company overview:\nEmployees: 10\nDepartments: Engineering, Sales"));
    }

    #[test]
    fn test_history_keeps_general_user_turns_only() {
        let history = vec![
            LlmMessage::user("what is a notice period?"),
            LlmMessage::user("what is bob's salary?"),
            LlmMessage {
                role: Role::Assistant,
                content: "Bob earns a lot".to_string(),
            },
            LlmMessage::user("tell me a joke"),
            LlmMessage::user("and another one"),
        ];
        let kept = forwardable_history(&history, &Lexicon::default(), 2);
        let texts: Vec<&str> = kept.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, vec!["tell me a joke", "and another one"]);

        let all = forwardable_history(&history, &Lexicon::default(), 10);
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|m| !m.content.contains("salary")));
    }
}
