//! Chat orchestration: classify, check identity, dispatch, assemble.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::config::{ChatConfig, LlmConfig};
use crate::error::{HcmError, HcmResult};
use crate::llm::{LlmClient, LlmMessage};
use crate::models::Employee;
use crate::store::{EmployeeFilter, EntityStore};

use super::actions;
use super::delegate::{self, CompanySnapshot, Sampling};
use super::intent::{Intent, Lexicon, classify, normalize};
use super::navigation;
use super::queries::{self, QueryContext};
use super::trace::ChatTrace;

/// One chat message with its optional context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInput {
    /// The user's message.
    pub message: String,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub history: Vec<LlmMessage>,
    /// Return the steps taken alongside the reply.
    #[serde(default)]
    pub verbose: bool,
}

impl ChatInput {
    /// A bare message with no history.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// The answer to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text.
    pub text: String,
    /// How the message was routed.
    pub intent: Intent,
    /// Steps taken, in order.
    pub steps: Vec<String>,
}

const NO_EMPLOYEE_RECORD: &str =
    "No employee record found for your account, so I can't do that for you. Ask HR to link your login to your employee profile.";

/// Answers chat messages against the entity store, falling back to the
/// language model for general questions.
///
/// Business-rule refusals are `Ok` replies. Errors are reserved for a
/// missing identity, store failures and language model failures.
pub struct ChatEngine {
    store: Arc<dyn EntityStore>,
    llm: Arc<dyn LlmClient>,
    clock: Arc<dyn Clock>,
    config: ChatConfig,
    sampling: Sampling,
}

impl ChatEngine {
    /// Creates an engine over shared collaborators.
    pub fn new(
        store: Arc<dyn EntityStore>,
        llm: Arc<dyn LlmClient>,
        clock: Arc<dyn Clock>,
        config: ChatConfig,
        llm_config: &LlmConfig,
    ) -> Self {
        Self {
            store,
            llm,
            clock,
            config,
            sampling: Sampling {
                temperature: llm_config.temperature,
                max_tokens: llm_config.max_tokens,
            },
        }
    }

    /// Routes `input` and produces the reply.
    ///
    /// `caller` is the verified user id, or `None` for an anonymous request.
    /// Anonymous requests may only reach navigation help and the general
    /// fallback; anything else is [`HcmError::Unauthorized`].
    pub async fn respond(&self, caller: Option<u64>, input: &ChatInput) -> HcmResult<ChatReply> {
        let text = normalize(&input.message);
        if text.is_empty() {
            return Err(HcmError::InvalidRequest {
                message: "message must not be empty".to_string(),
            });
        }

        let employees = self.store.employees(&EmployeeFilter::default()).await?;
        let departments = self.store.departments().await?;
        let lexicon = Lexicon::from_records(&departments, &employees);
        let intent = classify(&text, &lexicon);

        let mut trace = ChatTrace::new();
        trace.step(format!("Classified message as {}", intent));

        if intent.requires_identity() && caller.is_none() {
            return Err(HcmError::Unauthorized {
                message: "Sign in to use attendance, leave and employee questions".to_string(),
            });
        }

        let caller_employee = match caller {
            Some(user_id) => self.store.employee_for_user(user_id).await?,
            None => None,
        };
        if let Some(employee) = &caller_employee {
            trace.step(format!("Caller is employee #{}", employee.id));
        }

        let now = self.clock.now();
        let text = match intent {
            Intent::ClockIn | Intent::ClockOut | Intent::RecordForReport | Intent::LeaveRequest => {
                match &caller_employee {
                    Some(employee) => self.act(intent, employee, &text, &mut trace).await?,
                    None => {
                        trace.step("No employee record linked to the caller");
                        NO_EMPLOYEE_RECORD.to_string()
                    }
                }
            }
            Intent::Navigation => {
                trace.step("Answered from navigation help");
                navigation::help(&text).to_string()
            }
            Intent::EmployeeData => {
                let ctx = QueryContext {
                    store: self.store.as_ref(),
                    now,
                    caller: caller_employee.as_ref(),
                    employees: &employees,
                    departments: &departments,
                    top_arrivals: self.config.top_arrivals,
                };
                queries::answer(&ctx, &text, &mut trace).await?
            }
            Intent::General => {
                let snapshot = CompanySnapshot::new(employees.len(), &departments);
                self.delegate(input, &lexicon, &snapshot, &mut trace).await?
            }
        };

        debug!(intent = %intent, steps = trace.steps().len(), "Chat reply assembled");
        Ok(ChatReply {
            text,
            intent,
            steps: trace.into_steps(),
        })
    }

    async fn act(&self, intent: Intent, caller: &Employee, text: &str, trace: &mut ChatTrace) -> HcmResult<String> {
        let store = self.store.as_ref();
        let now = self.clock.now();
        match intent {
            Intent::ClockIn => actions::clock_in(store, now, caller, trace).await,
            Intent::ClockOut => actions::clock_out(store, now, caller, trace).await,
            Intent::RecordForReport => actions::record_for_report(store, now, caller, text, trace).await,
            Intent::LeaveRequest => actions::request_leave(store, now, caller, text, trace).await,
            other => Err(HcmError::InvalidRequest {
                message: format!("{} is not an action", other),
            }),
        }
    }

    async fn delegate(
        &self,
        input: &ChatInput,
        lexicon: &Lexicon,
        snapshot: &CompanySnapshot,
        trace: &mut ChatTrace,
    ) -> HcmResult<String> {
        let settings = self.store.settings().await?;
        let history = delegate::forwardable_history(&input.history, lexicon, self.config.max_history_turns);
        trace.step(format!(
            "Forwarding to {} ({}) with {} setting(s) and {} prior turn(s)",
            self.llm.provider_name(),
            self.llm.model_name(),
            settings.len(),
            history.len()
        ));
        let request = delegate::completion_request(&input.message, history, &settings, snapshot, self.sampling);
        let reply = self.llm.complete(&request).await?;
        trace.step("Language model replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::clock::FixedClock;
    use crate::llm::CompletionRequest;
    use crate::models::{AttendanceFilter, LeaveFilter, LeaveStatus, LeaveType, NewUser};
    use crate::store::{MemoryStore, seed_demo_data};

    #[derive(Default)]
    struct RecordingLlm {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, request: &CompletionRequest) -> HcmResult<String> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("General answer".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        llm: Arc<RecordingLlm>,
        engine: ChatEngine,
    }

    async fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 10, 14, 9, 30, 0).unwrap()));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        seed_demo_data(&store, "hash").await.unwrap();
        let llm = Arc::new(RecordingLlm::default());
        let engine = ChatEngine::new(
            store.clone(),
            llm.clone(),
            clock,
            ChatConfig::default(),
            &LlmConfig::default(),
        );
        Fixture { store, llm, engine }
    }

    // Seeded user ids equal employee ids: 4 is David Brown (no reports),
    // 1 is Alice Johnson (manages Bob, Grace and Jack).
    const DAVID: Option<u64> = Some(4);
    const ALICE: Option<u64> = Some(1);

    #[tokio::test]
    async fn test_clock_in_twice_is_idempotent() {
        let f = fixture().await;
        let first = f.engine.respond(DAVID, &ChatInput::new("Clock me in")).await.unwrap();
        assert_eq!(first.intent, Intent::ClockIn);
        assert_eq!(first.text, "Clocked in at 09:30 UTC on 2025-10-14. Have a great day!");

        let second = f.engine.respond(DAVID, &ChatInput::new("clock in")).await.unwrap();
        assert_eq!(
            second.text,
            "You already clocked in today at 09:30 UTC. You haven't clocked out yet."
        );

        let records = f.store.attendance(&AttendanceFilter::default()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].clock_out.is_none());
    }

    #[tokio::test]
    async fn test_clock_out_without_session_writes_nothing() {
        let f = fixture().await;
        let reply = f.engine.respond(DAVID, &ChatInput::new("clock out")).await.unwrap();
        assert_eq!(reply.text, "You haven't clocked in today. Please clock in first.");
        assert!(f.store.attendance(&AttendanceFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sick_leave_tomorrow() {
        let f = fixture().await;
        let reply = f
            .engine
            .respond(DAVID, &ChatInput::new("I'm sick, I need a day off tomorrow"))
            .await
            .unwrap();
        assert_eq!(reply.intent, Intent::LeaveRequest);
        assert_eq!(
            reply.text,
            "Leave request submitted: Sick Leave from 2025-10-15 to 2025-10-15 (1 day). Status: Pending. Your manager will review it."
        );

        let requests = f.store.leave_requests(&LeaveFilter::default()).await.unwrap();
        assert_eq!(requests.len(), 1);
        let day = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        assert_eq!(requests[0].start_date, day);
        assert_eq!(requests[0].end_date, day);
        assert_eq!(requests[0].leave_type, LeaveType::SickLeave);
        assert_eq!(requests[0].status, LeaveStatus::Pending);
        assert_eq!(requests[0].day_count(), 1);
    }

    #[tokio::test]
    async fn test_reversed_leave_dates_are_refused() {
        let f = fixture().await;
        let reply = f
            .engine
            .respond(DAVID, &ChatInput::new("request leave from 2025-10-20 to 2025-10-10"))
            .await
            .unwrap();
        assert_eq!(reply.intent, Intent::LeaveRequest);
        assert_eq!(
            reply.text,
            "The end date 2025-10-10 is before the start date 2025-10-20. Please give the first day of leave first."
        );
        assert!(f.store.leave_requests(&LeaveFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_manager_cannot_record_for_others() {
        let f = fixture().await;
        let reply = f.engine.respond(DAVID, &ChatInput::new("clock in for Bob")).await.unwrap();
        assert_eq!(reply.intent, Intent::RecordForReport);
        assert!(reply.text.starts_with("You don't have any direct reports"));
        assert!(f.store.attendance(&AttendanceFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manager_records_for_report_only() {
        let f = fixture().await;
        let reply = f.engine.respond(ALICE, &ChatInput::new("clock in for Bob")).await.unwrap();
        assert_eq!(reply.text, "Clocked in Bob Smith at 09:30 UTC on 2025-10-14.");

        let refused = f.engine.respond(ALICE, &ChatInput::new("clock in for David")).await.unwrap();
        assert!(refused.text.starts_with("David Brown is not one of your direct reports"));

        let records = f.store.attendance(&AttendanceFilter::default()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].employee_id, 2);
    }

    #[tokio::test]
    async fn test_tenure_question_is_answered_locally() {
        let f = fixture().await;
        let reply = f.engine.respond(DAVID, &ChatInput::new("Who has the longest tenure?")).await.unwrap();
        assert_eq!(reply.intent, Intent::EmployeeData);
        assert!(reply.text.contains("1. Emma Davis: 7.12 years (hired 2018-09-01)"));
        assert!(f.llm.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_employee_data_never_reaches_llm() {
        let f = fixture().await;
        for message in [
            "What is Alice's salary?",
            "who reports to carol",
            "Tell me about Grace",
            "list everyone in Sales",
            "who hasn't clocked in today?",
        ] {
            let reply = f.engine.respond(DAVID, &ChatInput::new(message)).await.unwrap();
            assert_eq!(reply.intent, Intent::EmployeeData, "{}", message);
        }
        assert!(f.llm.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_general_prompt_carries_aggregates_only() {
        let f = fixture().await;
        let input = ChatInput {
            message: "What's a good way to prepare for a performance review?".to_string(),
            history: vec![
                LlmMessage::user("What is Bob Smith's salary?"),
                LlmMessage::user("Any tips for onboarding?"),
            ],
            verbose: true,
        };
        let reply = f.engine.respond(None, &input).await.unwrap();
        assert_eq!(reply.intent, Intent::General);
        assert_eq!(reply.text, "General answer");

        let requests = f.llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.system_prompt.contains("company_name: Acme Corp"));
        assert!(request.system_prompt.contains("Employees: 10\nDepartments: Engineering, Human Resources, Sales"));

        let employees = f.store.employees(&EmployeeFilter::default()).await.unwrap();
        let outgoing: Vec<&str> = std::iter::once(request.system_prompt.as_str())
            .chain(request.messages.iter().map(|m| m.content.as_str()))
            .collect();
        for employee in &employees {
            for text in &outgoing {
                assert!(!text.contains(&employee.name), "{} leaked", employee.name);
                assert!(!text.contains(&employee.email), "{} leaked", employee.email);
            }
        }
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_callers_need_identity_for_local_data() {
        let f = fixture().await;
        let err = f.engine.respond(None, &ChatInput::new("clock in")).await.unwrap_err();
        assert!(matches!(err, HcmError::Unauthorized { .. }));
        let err = f.engine.respond(None, &ChatInput::new("who reports to alice")).await.unwrap_err();
        assert!(matches!(err, HcmError::Unauthorized { .. }));

        let help = f.engine.respond(None, &ChatInput::new("help")).await.unwrap();
        assert_eq!(help.intent, Intent::Navigation);
    }

    #[tokio::test]
    async fn test_user_without_employee_gets_conversational_reply() {
        let f = fixture().await;
        let user = f
            .store
            .create_user(NewUser {
                username: "contractor".to_string(),
                email: "contractor@company.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let reply = f.engine.respond(Some(user.id), &ChatInput::new("clock in")).await.unwrap();
        assert_eq!(reply.text, NO_EMPLOYEE_RECORD);
        assert!(f.store.attendance(&AttendanceFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_is_invalid() {
        let f = fixture().await;
        let err = f.engine.respond(DAVID, &ChatInput::new("   ")).await.unwrap_err();
        assert!(matches!(err, HcmError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_trace_records_routing() {
        let f = fixture().await;
        let reply = f.engine.respond(DAVID, &ChatInput::new("clock in")).await.unwrap();
        assert_eq!(reply.steps[0], "Classified message as clock_in");
        assert_eq!(reply.steps[1], "Caller is employee #4");
        assert!(reply.steps.last().unwrap().starts_with("Created attendance record"));
    }
}
