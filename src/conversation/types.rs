// src/conversation/types.rs — Sessions, messages and stored history records

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned session identifier. The backend may hand out integers or
/// strings; the client treats both as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    Int(i64),
    Str(String),
}

impl SessionId {
    /// Parse user input: all-digit input becomes `Int`, anything else `Str`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => SessionId::Int(n),
            Err(_) => SessionId::Str(raw.to_string()),
        })
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionId::Int(n) => write!(f, "{n}"),
            SessionId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SessionId {
    fn from(n: i64) -> Self {
        SessionId::Int(n)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId::Str(s.to_string())
    }
}

/// A persisted conversation thread. Only ever replaced from server data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            model_used: None,
        }
    }

    pub fn assistant(text: impl Into<String>, model_used: Option<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            model_used,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}

/// One stored prompt/response pair as the memory endpoint returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub prompt: String,
    pub response: String,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Turn newest-first history into a chronological, flat transcript: every
/// record becomes its prompt followed by its response.
pub fn flatten_history(mut records: Vec<HistoryRecord>) -> Vec<Message> {
    records.reverse();
    records
        .into_iter()
        .flat_map(|r| {
            [
                Message::user(r.prompt),
                Message::assistant(r.response, r.model_used),
            ]
        })
        .collect()
}

/// Accept RFC 3339 as well as the offset-less ISO form many Python backends
/// emit (read as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}
