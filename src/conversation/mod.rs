// src/conversation/mod.rs — Conversation view-model
//
// Owns what the dashboard shows: the session list, the selected session,
// its transcript and the in-flight send. All state sits behind one mutex
// that is never held across an await, so operations can interleave
// (a session switch while a fetch or send is still out) without ever
// observing a half-applied update.

pub mod format;
pub mod types;

pub use format::{format_assistant_text, preview, Bullets, Preview, DEFAULT_PREVIEW_BULLETS};
pub use types::{flatten_history, HistoryRecord, Message, Sender, Session, SessionId};

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{ChatBackend, ChatRequest};
use crate::auth::Credentials;
use crate::infra::errors::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Per-send state machine: `Idle → Sending → (committed | rolled back) → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    Sending {
        /// Transcript generation the send was issued against.
        generation: u64,
        /// Position of the optimistic user message.
        user_index: usize,
    },
}

/// How a `send_message` call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input or another send already in flight; nothing changed.
    Ignored,
    /// No credential; aborted before any network call.
    Unauthenticated,
    /// Reply received. `session_id` is the session it was stored under.
    Committed { session_id: Option<SessionId> },
    /// The request failed and the optimistic message was removed.
    RolledBack { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Server order, replaced wholesale on every load.
    pub sessions: Vec<Session>,
    /// `None` is a new, unsaved conversation.
    pub active_session_id: Option<SessionId>,
    pub transcript: Vec<Message>,
    pub send: SendState,
    pub draft_text: String,
    expanded: BTreeSet<usize>,
    /// Bumped whenever the transcript is reset for a different conversation.
    generation: u64,
    sessions_seq: u64,
    notices: Vec<Notice>,
}

impl ConversationState {
    pub fn is_pending(&self) -> bool {
        matches!(self.send, SendState::Sending { .. })
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Reset for a different conversation. In-flight transcript fetches
    /// and sends issued before this point no longer apply.
    fn reset_transcript(&mut self) {
        self.generation += 1;
        self.transcript.clear();
        self.expanded.clear();
    }

    /// Install a fetched transcript. A send still in flight against this
    /// transcript keeps its optimistic message at the end.
    fn replace_transcript(&mut self, messages: Vec<Message>) {
        let pending = match self.send {
            SendState::Sending {
                generation,
                user_index,
            } if generation == self.generation => self.transcript.get(user_index).cloned(),
            _ => None,
        };
        self.transcript = messages;
        if let Some(message) = pending {
            self.transcript.push(message);
            self.send = SendState::Sending {
                generation: self.generation,
                user_index: self.transcript.len() - 1,
            };
        }
    }
}

pub struct ConversationViewModel {
    backend: Arc<dyn ChatBackend>,
    credentials: Credentials,
    state: Mutex<ConversationState>,
}

impl ConversationViewModel {
    pub fn new(backend: Arc<dyn ChatBackend>, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
            state: Mutex::new(ConversationState::default()),
        }
    }

    /// Fresh view-model with the session list fetched once.
    pub async fn mount(backend: Arc<dyn ChatBackend>, credentials: Credentials) -> Self {
        let vm = Self::new(backend, credentials);
        vm.load_sessions().await;
        vm
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ─── Reads ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> ConversationState {
        self.lock().clone()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock().sessions.clone()
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.lock().active_session_id.clone()
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    pub fn draft_text(&self) -> String {
        self.lock().draft_text.clone()
    }

    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.lock().draft_text = text.into();
    }

    pub fn incognito(&self) -> bool {
        self.credentials.incognito()
    }

    pub fn set_incognito(&self, enabled: bool) -> Result<(), ClientError> {
        self.credentials.set_incognito(enabled)?;
        let message = if enabled {
            "Incognito mode on: your activity won't be saved."
        } else {
            "Incognito mode off."
        };
        self.lock().notify(NoticeLevel::Info, message);
        Ok(())
    }

    /// Drain pending notifications, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }

    pub fn expand(&self, index: usize) {
        self.lock().expanded.insert(index);
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.lock().is_expanded(index)
    }

    // ─── Sessions ───────────────────────────────────────────────────────

    /// Replace the session list from the backend. Failures leave an empty
    /// list plus an error notice; only the latest call's result lands.
    pub async fn load_sessions(&self) {
        let Some(token) = self.credentials.token() else {
            self.lock().sessions.clear();
            return;
        };
        let seq = {
            let mut state = self.lock();
            state.sessions_seq += 1;
            state.sessions_seq
        };

        let result = self.backend.list_sessions(&token).await;

        let mut state = self.lock();
        if seq != state.sessions_seq {
            tracing::debug!("Dropping superseded session list");
            return;
        }
        match result {
            Ok(sessions) => {
                tracing::debug!("Loaded {} session(s)", sessions.len());
                state.sessions = sessions;
            }
            Err(e) => {
                tracing::warn!("Failed to load sessions: {}", e);
                state.sessions.clear();
                state.notify(NoticeLevel::Error, e.to_string());
            }
        }
    }

    /// Switch to `id` and reload its transcript. The id is not checked
    /// against the known sessions.
    pub async fn select_session(&self, id: SessionId) {
        {
            let mut state = self.lock();
            state.active_session_id = Some(id.clone());
            state.reset_transcript();
        }
        self.load_transcript(Some(id)).await;
    }

    /// Deselect without deleting anything.
    pub fn start_new_conversation(&self) {
        let mut state = self.lock();
        state.active_session_id = None;
        state.draft_text.clear();
        state.reset_transcript();
    }

    /// Fetch and install the transcript of `session_id`. The result is
    /// discarded if the selection moved on while the request was out.
    /// `None` clears the transcript without a request.
    pub async fn load_transcript(&self, session_id: Option<SessionId>) {
        let generation = self.lock().generation;

        let Some(id) = session_id else {
            let mut state = self.lock();
            if state.generation == generation && state.active_session_id.is_none() {
                state.replace_transcript(Vec::new());
            }
            return;
        };

        let result = match self.credentials.token() {
            Some(token) => self.backend.history(&token, Some(&id)).await,
            None => Err(ClientError::Unauthenticated),
        };

        let mut state = self.lock();
        if state.generation != generation || state.active_session_id.as_ref() != Some(&id) {
            tracing::debug!("Dropping stale transcript for session {}", id);
            return;
        }
        match result {
            Ok(records) => {
                tracing::debug!("Loaded {} record(s) for session {}", records.len(), id);
                state.replace_transcript(flatten_history(records));
            }
            Err(e) => {
                tracing::warn!("Failed to load transcript for session {}: {}", id, e);
                state.replace_transcript(Vec::new());
                state.notify(NoticeLevel::Error, e.to_string());
            }
        }
    }

    // ─── Sending ────────────────────────────────────────────────────────

    /// Send whatever is in the draft.
    pub async fn submit_draft(&self) -> SendOutcome {
        let draft = self.draft_text();
        self.send_message(&draft).await
    }

    /// Send `text` as the next prompt of the active conversation.
    ///
    /// The user message is shown before the request goes out and removed
    /// again if it fails. At most one send is in flight; further calls
    /// while one is pending are dropped.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let (token, request) = {
            let mut state = self.lock();
            if text.trim().is_empty() || state.is_pending() {
                return SendOutcome::Ignored;
            }
            let Some(token) = self.credentials.token() else {
                state.notify(NoticeLevel::Error, "User not authenticated");
                return SendOutcome::Unauthenticated;
            };

            state.transcript.push(Message::user(text));
            state.draft_text.clear();
            state.send = SendState::Sending {
                generation: state.generation,
                user_index: state.transcript.len() - 1,
            };

            let request = ChatRequest {
                prompt: text.to_string(),
                incognito: self.credentials.incognito(),
                session_id: state.active_session_id.clone(),
            };
            (token, request)
        };

        let result = self.backend.send(&token, &request).await;

        let outcome = {
            let mut state = self.lock();
            let issued = std::mem::take(&mut state.send);
            let current = match issued {
                SendState::Sending {
                    generation,
                    user_index,
                } if generation == state.generation => Some(user_index),
                _ => None,
            };

            match result {
                Ok(reply) => {
                    if current.is_some() {
                        state
                            .transcript
                            .push(Message::assistant(reply.response, reply.model_used));
                        if let Some(id) = &reply.session_id {
                            if state.active_session_id.as_ref() != Some(id) {
                                tracing::info!("Conversation saved as session {}", id);
                                state.active_session_id = Some(id.clone());
                            }
                        }
                    } else {
                        tracing::debug!("Reply arrived after the conversation changed");
                    }
                    SendOutcome::Committed {
                        session_id: reply.session_id,
                    }
                }
                Err(e) => {
                    tracing::warn!("Send failed: {}", e);
                    if let Some(index) = current {
                        if state.transcript.get(index).map(|m| m.text.as_str())
                            == Some(request.prompt.as_str())
                        {
                            state.transcript.remove(index);
                        }
                    }
                    state.notify(NoticeLevel::Error, e.to_string());
                    SendOutcome::RolledBack {
                        reason: e.to_string(),
                    }
                }
            }
        };

        if matches!(outcome, SendOutcome::Committed { .. }) {
            self.load_sessions().await;
        }
        outcome
    }
}
