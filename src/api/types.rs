// src/api/types.rs — Request/response bodies of the backend API

use serde::{Deserialize, Serialize};

pub use crate::conversation::types::{HistoryRecord, Session, SessionId};

/// Body of `POST /api/v1/chat/route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub incognito: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

/// Reply to a chat request. `session_id` is the session the exchange was
/// stored under, freshly created when the request carried none.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

/// Body of the email/password login and register calls.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
