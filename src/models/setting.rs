//! Chatbot settings and chat feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An operator-supplied key/value pair injected into the assistant's
/// system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Unique key.
    pub key: String,
    /// Free-form value, used verbatim.
    #[serde(default)]
    pub value: String,
    /// What the setting is for.
    #[serde(default)]
    pub description: String,
}

/// A user's rating of one assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Unique identifier.
    pub id: u64,
    /// The rating user, when signed in.
    pub user_id: Option<u64>,
    /// The question that was asked.
    pub question: String,
    /// The answer that was given.
    pub response: String,
    /// Rating label (e.g. "helpful").
    pub rating: String,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// When the feedback was left.
    pub created_at: DateTime<Utc>,
}

/// Input for recording feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedback {
    /// The rating user, when signed in.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// The question that was asked.
    pub question: String,
    /// The answer that was given.
    pub response: String,
    /// Rating label.
    pub rating: String,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
}
