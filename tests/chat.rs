//! Chat engine tests focused on what reaches the language model.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use hcm_assistant::chat::{ChatEngine, ChatInput, Intent};
use hcm_assistant::clock::FixedClock;
use hcm_assistant::config::{ChatConfig, LlmConfig};
use hcm_assistant::error::{HcmError, HcmResult};
use hcm_assistant::llm::{CompletionRequest, LlmClient, LlmMessage, Role};
use hcm_assistant::store::{MemoryStore, seed_demo_data};

#[derive(Default)]
struct RecordingLlm {
    requests: Mutex<Vec<CompletionRequest>>,
    fail: bool,
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn complete(&self, request: &CompletionRequest) -> HcmResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(HcmError::upstream("status 502: bad gateway"));
        }
        Ok("Happy to help.".to_string())
    }

    fn model_name(&self) -> &str {
        "recording"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

async fn engine_with(llm: Arc<RecordingLlm>) -> ChatEngine {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 10, 14, 9, 0, 0).unwrap(),
    ));
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    seed_demo_data(&store, "hash").await.unwrap();
    ChatEngine::new(store, llm, clock, ChatConfig::default(), &LlmConfig::default())
}

const NAMES: [&str; 5] = ["Alice", "Bob", "Carol", "David", "Emma"];

#[tokio::test]
async fn test_general_question_carries_only_aggregates() {
    let llm = Arc::new(RecordingLlm::default());
    let engine = engine_with(llm.clone()).await;

    let reply = engine
        .respond(Some(4), &ChatInput::new("What makes a good one-on-one meeting?"))
        .await
        .unwrap();
    assert_eq!(reply.intent, Intent::General);
    assert_eq!(reply.text, "Happy to help.");

    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].system_prompt;
    assert!(prompt.contains("Employees: 10"));
    assert!(prompt.contains("Departments: Engineering, Human Resources, Sales"));
    for name in NAMES {
        assert!(!prompt.contains(name), "prompt leaked {}", name);
    }
    let last = requests[0].messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, "What makes a good one-on-one meeting?");
}

#[tokio::test]
async fn test_history_about_employees_is_not_forwarded() {
    let llm = Arc::new(RecordingLlm::default());
    let engine = engine_with(llm.clone()).await;

    let input = ChatInput {
        message: "Any tips for running a retrospective?".to_string(),
        history: vec![
            LlmMessage::user("Who reports to Alice?"),
            LlmMessage {
                role: Role::Assistant,
                content: "Bob Smith reports to Alice Johnson.".to_string(),
            },
            LlmMessage::user("What is a good icebreaker?"),
        ],
        verbose: false,
    };
    engine.respond(Some(4), &input).await.unwrap();

    let requests = llm.requests.lock().unwrap();
    let forwarded: Vec<&str> = requests[0]
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert!(forwarded.contains(&"What is a good icebreaker?"));
    for content in &forwarded {
        for name in NAMES {
            assert!(!content.contains(name), "history leaked {}", name);
        }
    }
}

#[tokio::test]
async fn test_employee_questions_stay_local() {
    let llm = Arc::new(RecordingLlm::default());
    let engine = engine_with(llm.clone()).await;

    for message in [
        "Who reports to Carol?",
        "Who has the longest tenure?",
        "Tell me about Emma",
        "Who hasn't clocked in today?",
    ] {
        let reply = engine.respond(Some(4), &ChatInput::new(message)).await.unwrap();
        assert_eq!(reply.intent, Intent::EmployeeData, "{}", message);
    }
    assert!(llm.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_reported() {
    let llm = Arc::new(RecordingLlm {
        fail: true,
        ..RecordingLlm::default()
    });
    let engine = engine_with(llm).await;

    let err = engine
        .respond(None, &ChatInput::new("Tell me a joke"))
        .await
        .unwrap_err();
    assert!(matches!(err, HcmError::Upstream { .. }));
}
