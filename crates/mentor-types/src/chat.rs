//! Chat message, engine state, and remote endpoint payload types for Mentor.
//!
//! These types model one conversation with a persona: the message log entries,
//! the busy/idle liveness of the engine, and the JSON bodies exchanged with
//! the persona's remote chat endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Ai => write!(f, "ai"),
        }
    }
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// UUID v7, unique within (and across) sessions.
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    /// Creation time, or for AI replies the backend-reported time if present.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User, Utc::now())
    }

    pub fn ai(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(content, Sender::Ai, timestamp)
    }

    fn new(content: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            content: content.into(),
            sender,
            timestamp,
        }
    }
}

/// Liveness of a chat engine: whether a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Busy,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Busy => write!(f, "busy"),
        }
    }
}

/// Body of `POST <base>/api/<endpoint>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Successful response body from a chat endpoint.
///
/// Only `reply` is required; `timestamp` is an optional ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ChatReply {
    /// The backend-reported timestamp, if present and parseable.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Why a submission was refused before any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Text was empty or whitespace only.
    Empty,
    /// A previous request is still in flight.
    Busy,
}

/// What a call to `send_message` ended up doing. Never an error: failures
/// are folded into the `Fallback` apology message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Rejected(RejectReason),
    /// The backend answered; carries the appended AI message.
    Replied(ChatMessage),
    /// The exchange failed; carries the appended apology message.
    Fallback(ChatMessage),
}

impl SendOutcome {
    /// The AI message appended by this call, if any.
    pub fn ai_message(&self) -> Option<&ChatMessage> {
        match self {
            SendOutcome::Replied(m) | SendOutcome::Fallback(m) => Some(m),
            SendOutcome::Rejected(_) => None,
        }
    }
}
