// src/cli/history.rs — One-shot session list and history printing

use super::render;
use crate::api::ChatBackend;
use crate::auth::Credentials;
use crate::conversation::{flatten_history, SessionId};
use crate::infra::errors::ClientError;

pub async fn run_sessions(
    backend: &dyn ChatBackend,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    let token = credentials.token().ok_or(ClientError::Unauthenticated)?;
    let sessions = backend.list_sessions(&token).await?;
    if sessions.is_empty() {
        eprintln!("No saved conversations yet.");
        return Ok(());
    }
    for (i, s) in sessions.iter().enumerate() {
        println!("{}", render::session_line(i + 1, s, None));
    }
    Ok(())
}

/// Print a stored transcript in full. Without a session id the backend's
/// unscoped history is shown.
pub async fn run_history(
    backend: &dyn ChatBackend,
    credentials: &Credentials,
    session: Option<&str>,
    preview_limit: usize,
) -> anyhow::Result<()> {
    let token = credentials.token().ok_or(ClientError::Unauthenticated)?;
    let session_id = match session {
        Some(raw) => Some(
            SessionId::parse(raw)
                .ok_or_else(|| ClientError::Validation("Session id must not be empty".into()))?,
        ),
        None => None,
    };
    let records = backend.history(&token, session_id.as_ref()).await?;
    if records.is_empty() {
        eprintln!("Nothing stored yet.");
        return Ok(());
    }
    let messages = flatten_history(records);
    println!("{}", render::transcript(&messages, |_| true, preview_limit));
    Ok(())
}
