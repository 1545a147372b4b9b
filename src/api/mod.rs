// src/api/mod.rs — Session/memory API seam

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::infra::errors::ClientError;
pub use client::HttpBackend;
pub use types::{AuthToken, ChatReply, ChatRequest, HistoryRecord, Session, SessionId};

/// What the conversation view-model needs from the backend. Every call
/// carries the bearer token explicitly; the backend owns all persistence.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sessions of the authenticated user, in the server's order.
    async fn list_sessions(&self, token: &str) -> Result<Vec<Session>, ClientError>;

    /// Stored prompt/response pairs, newest first. `None` asks for the
    /// user's unscoped history.
    async fn history(
        &self,
        token: &str,
        session_id: Option<&SessionId>,
    ) -> Result<Vec<HistoryRecord>, ClientError>;

    async fn send(&self, token: &str, request: &ChatRequest) -> Result<ChatReply, ClientError>;
}
