// tests/conversation_test.rs — Conversation view-model against a mock backend

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

use memchat::api::{ChatBackend, ChatReply, ChatRequest, HistoryRecord, Session, SessionId};
use memchat::auth::{Credentials, INCOGNITO_KEY, TOKEN_KEY};
use memchat::conversation::{
    ConversationViewModel, Message, NoticeLevel, SendOutcome, SendState,
};
use memchat::infra::errors::ClientError;
use memchat::storage::MemoryStore;

// ---------- Mock backend ----------

/// Canned backend. Calls can be held at a named gate until the test
/// releases them, which lets tests pick the order requests resolve in.
#[derive(Default)]
struct MockBackend {
    /// `None` makes list_sessions fail.
    sessions: Mutex<Option<Vec<Session>>>,
    /// Missing key makes history fail.
    history: Mutex<HashMap<String, Vec<HistoryRecord>>>,
    replies: Mutex<VecDeque<Result<ChatReply, String>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            sessions: Mutex::new(Some(Vec::new())),
            ..Default::default()
        }
    }

    fn with_sessions(self, sessions: Vec<Session>) -> Self {
        *self.sessions.lock().unwrap() = Some(sessions);
        self
    }

    fn failing_sessions(self) -> Self {
        *self.sessions.lock().unwrap() = None;
        self
    }

    fn with_history(self, id: &str, records: Vec<HistoryRecord>) -> Self {
        self.history.lock().unwrap().insert(id.to_string(), records);
        self
    }

    fn reply(&self, reply: Result<ChatReply, &str>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(reply.map_err(|e| e.to_string()));
    }

    fn set_sessions(&self, sessions: Vec<Session>) {
        *self.sessions.lock().unwrap() = Some(sessions);
    }

    fn hold(&self, gate: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(gate.to_string(), notify.clone());
        notify
    }

    async fn pass(&self, gate: &str) {
        let notify = self.gates.lock().unwrap().get(gate).cloned();
        if let Some(n) = notify {
            n.notified().await;
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn sent(&self) -> Vec<ChatRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn list_sessions(&self, _token: &str) -> Result<Vec<Session>, ClientError> {
        self.calls.lock().unwrap().push("sessions".into());
        self.pass("sessions").await;
        let sessions = self.sessions.lock().unwrap().clone();
        sessions.ok_or_else(|| ClientError::Http {
            status: 500,
            message: "Failed to fetch sessions".into(),
        })
    }

    async fn history(
        &self,
        _token: &str,
        session_id: Option<&SessionId>,
    ) -> Result<Vec<HistoryRecord>, ClientError> {
        let key = session_id.map(|s| s.to_string()).unwrap_or_default();
        self.calls.lock().unwrap().push(format!("history:{key}"));
        self.pass(&format!("history:{key}")).await;
        let records = self.history.lock().unwrap().get(&key).cloned();
        records.ok_or_else(|| ClientError::Transport("connection refused".into()))
    }

    async fn send(&self, _token: &str, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        self.calls.lock().unwrap().push(format!("send:{}", request.prompt));
        self.sent.lock().unwrap().push(request.clone());
        self.pass("send").await;
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(r)) => Ok(r),
            Some(Err(message)) => Err(ClientError::Http {
                status: 500,
                message,
            }),
            None => Err(ClientError::Transport("no canned reply".into())),
        }
    }
}

// ---------- Helpers ----------

fn session(id: i64, title: &str) -> Session {
    Session {
        id: SessionId::Int(id),
        title: title.into(),
        last_updated: None,
    }
}

fn record(prompt: &str, response: &str, model: &str) -> HistoryRecord {
    HistoryRecord {
        prompt: prompt.into(),
        response: response.into(),
        model_used: Some(model.into()),
        timestamp: None,
    }
}

fn reply(text: &str, model: &str, session_id: Option<i64>) -> ChatReply {
    ChatReply {
        response: text.into(),
        model_used: Some(model.into()),
        session_id: session_id.map(SessionId::Int),
    }
}

fn logged_in() -> Credentials {
    Credentials::new(Arc::new(MemoryStore::with_entries([(TOKEN_KEY, "jwt")])))
}

fn logged_out() -> Credentials {
    Credentials::new(Arc::new(MemoryStore::new()))
}

fn view_model(backend: &Arc<MockBackend>, credentials: Credentials) -> ConversationViewModel {
    ConversationViewModel::new(backend.clone(), credentials)
}

// ---------- Sessions ----------

#[tokio::test]
async fn test_mount_loads_sessions_once() {
    let backend = Arc::new(MockBackend::new().with_sessions(vec![
        session(2, "Newest"),
        session(1, "Oldest"),
    ]));
    let vm = ConversationViewModel::mount(backend.clone(), logged_in()).await;

    let titles: Vec<String> = vm.sessions().into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Newest", "Oldest"]);
    assert_eq!(backend.calls(), vec!["sessions"]);
    assert!(vm.active_session_id().is_none());
    assert!(vm.transcript().is_empty());
}

#[tokio::test]
async fn test_load_sessions_failure_is_fail_soft() {
    let backend = Arc::new(MockBackend::new().with_sessions(vec![session(1, "Kept?")]));
    let vm = view_model(&backend, logged_in());
    vm.load_sessions().await;
    assert_eq!(vm.sessions().len(), 1);

    backend.sessions.lock().unwrap().take();
    vm.load_sessions().await;
    assert!(vm.sessions().is_empty());

    let notices = vm.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Failed to fetch sessions");
    assert!(vm.take_notices().is_empty());
}

#[tokio::test]
async fn test_load_sessions_without_token_skips_network() {
    let backend = Arc::new(MockBackend::new().failing_sessions());
    let vm = view_model(&backend, logged_out());
    vm.load_sessions().await;
    assert!(vm.sessions().is_empty());
    assert!(backend.calls().is_empty());
    assert!(vm.take_notices().is_empty());
}

// ---------- Transcript ----------

#[tokio::test]
async fn test_select_session_flattens_history() {
    let backend = Arc::new(
        MockBackend::new().with_history("7", vec![record("Hi", "Hello there", "gpt")]),
    );
    let vm = view_model(&backend, logged_in());

    vm.select_session(SessionId::Int(7)).await;

    assert_eq!(vm.active_session_id(), Some(SessionId::Int(7)));
    assert_eq!(
        vm.transcript(),
        vec![
            Message::user("Hi"),
            Message::assistant("Hello there", Some("gpt".into())),
        ]
    );
}

#[tokio::test]
async fn test_history_is_shown_oldest_first() {
    let backend = Arc::new(MockBackend::new().with_history(
        "3",
        vec![record("second", "b", "m"), record("first", "a", "m")],
    ));
    let vm = view_model(&backend, logged_in());
    vm.select_session(SessionId::Int(3)).await;

    let texts: Vec<String> = vm.transcript().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["first", "a", "second", "b"]);
}

#[tokio::test]
async fn test_transcript_failure_empties_and_notifies() {
    let backend = Arc::new(MockBackend::new().with_history("1", vec![record("q", "a", "m")]));
    let vm = view_model(&backend, logged_in());
    vm.select_session(SessionId::Int(1)).await;
    assert_eq!(vm.transcript().len(), 2);

    vm.select_session(SessionId::Int(99)).await;
    assert!(vm.transcript().is_empty());
    assert_eq!(vm.active_session_id(), Some(SessionId::Int(99)));
    assert_eq!(vm.take_notices().len(), 1);
}

#[tokio::test]
async fn test_stale_transcript_is_discarded() {
    let backend = Arc::new(
        MockBackend::new()
            .with_history("1", vec![record("from one", "r1", "m")])
            .with_history("2", vec![record("from two", "r2", "m")]),
    );
    let gate = backend.hold("history:1");
    let vm = view_model(&backend, logged_in());

    let first = vm.select_session(SessionId::Int(1));
    tokio::pin!(first);
    assert!(futures::poll!(&mut first).is_pending());

    vm.select_session(SessionId::Int(2)).await;
    gate.notify_one();
    first.await;

    assert_eq!(vm.active_session_id(), Some(SessionId::Int(2)));
    assert_eq!(
        vm.transcript(),
        vec![Message::user("from two"), Message::assistant("r2", Some("m".into()))]
    );
}

#[tokio::test]
async fn test_in_order_resolution_ends_on_latest_selection() {
    let backend = Arc::new(
        MockBackend::new()
            .with_history("1", vec![record("one", "r1", "m")])
            .with_history("2", vec![record("two", "r2", "m")]),
    );
    let vm = view_model(&backend, logged_in());
    vm.select_session(SessionId::Int(1)).await;
    vm.select_session(SessionId::Int(2)).await;
    assert_eq!(vm.transcript()[0], Message::user("two"));
}

#[tokio::test]
async fn test_select_clears_expanded_state() {
    let backend = Arc::new(MockBackend::new().with_history("1", Vec::new()));
    let vm = view_model(&backend, logged_in());
    vm.expand(1);
    assert!(vm.is_expanded(1));
    vm.select_session(SessionId::Int(1)).await;
    assert!(!vm.is_expanded(1));
}

#[tokio::test]
async fn test_start_new_conversation_deselects() {
    let backend = Arc::new(
        MockBackend::new()
            .with_sessions(vec![session(1, "Keep me")])
            .with_history("1", vec![record("q", "a", "m")]),
    );
    let vm = ConversationViewModel::mount(backend.clone(), logged_in()).await;
    vm.select_session(SessionId::Int(1)).await;
    vm.set_draft_text("half typed");

    vm.start_new_conversation();

    assert!(vm.active_session_id().is_none());
    assert!(vm.transcript().is_empty());
    assert!(vm.draft_text().is_empty());
    assert_eq!(vm.sessions().len(), 1);
}

#[tokio::test]
async fn test_load_transcript_none_clears_without_request() {
    let backend = Arc::new(MockBackend::new());
    let vm = view_model(&backend, logged_in());
    vm.load_transcript(None).await;
    assert!(vm.transcript().is_empty());
    assert!(backend.calls().is_empty());
}

// ---------- Sending ----------

#[tokio::test]
async fn test_send_creates_session_and_refreshes_list() {
    let backend = Arc::new(MockBackend::new());
    backend.reply(Ok(reply("Hi! How can I help?", "gpt-4o", Some(42))));
    let vm = view_model(&backend, logged_in());

    vm.set_draft_text("Hello");
    backend.set_sessions(vec![session(42, "Hello")]);
    let outcome = vm.submit_draft().await;

    assert_eq!(
        outcome,
        SendOutcome::Committed {
            session_id: Some(SessionId::Int(42))
        }
    );
    assert_eq!(
        vm.transcript(),
        vec![
            Message::user("Hello"),
            Message::assistant("Hi! How can I help?", Some("gpt-4o".into())),
        ]
    );
    assert_eq!(vm.active_session_id(), Some(SessionId::Int(42)));
    assert_eq!(vm.sessions(), vec![session(42, "Hello")]);
    assert!(!vm.is_pending());
    assert!(vm.draft_text().is_empty());
    assert_eq!(backend.calls(), vec!["send:Hello", "sessions"]);

    let sent = backend.sent();
    assert_eq!(sent[0].session_id, None);
    assert!(!sent[0].incognito);
}

#[tokio::test]
async fn test_send_in_existing_session_carries_id() {
    let backend = Arc::new(MockBackend::new().with_history("5", Vec::new()));
    backend.reply(Ok(reply("Sure.", "claude", Some(5))));
    let vm = view_model(&backend, logged_in());
    vm.select_session(SessionId::Int(5)).await;

    vm.send_message("Follow up").await;

    assert_eq!(backend.sent()[0].session_id, Some(SessionId::Int(5)));
    assert_eq!(vm.active_session_id(), Some(SessionId::Int(5)));
    assert_eq!(vm.transcript().len(), 2);
}

#[tokio::test]
async fn test_send_reads_incognito_flag() {
    let backend = Arc::new(MockBackend::new());
    backend.reply(Ok(reply("ok", "m", None)));
    let store = MemoryStore::with_entries([(TOKEN_KEY, "jwt"), (INCOGNITO_KEY, "true")]);
    let vm = view_model(&backend, Credentials::new(Arc::new(store)));

    vm.send_message("secret question").await;

    assert!(backend.sent()[0].incognito);
    assert!(vm.active_session_id().is_none());
}

#[tokio::test]
async fn test_send_failure_rolls_back() {
    let backend = Arc::new(MockBackend::new().with_history("9", vec![record("q", "a", "m")]));
    backend.reply(Err("Model overloaded"));
    let vm = view_model(&backend, logged_in());
    vm.select_session(SessionId::Int(9)).await;
    let before = vm.transcript();

    let outcome = vm.send_message("Will this work?").await;

    assert_eq!(
        outcome,
        SendOutcome::RolledBack {
            reason: "Model overloaded".into()
        }
    );
    assert_eq!(vm.transcript(), before);
    assert_eq!(vm.active_session_id(), Some(SessionId::Int(9)));
    assert!(!vm.is_pending());
    let notices = vm.take_notices();
    assert_eq!(notices.last().unwrap().message, "Model overloaded");
    assert!(!backend.calls().contains(&"sessions".to_string()));
}

#[tokio::test]
async fn test_send_without_token_is_unauthenticated() {
    let backend = Arc::new(MockBackend::new());
    let vm = view_model(&backend, logged_out());
    vm.set_draft_text("Hello");

    let outcome = vm.submit_draft().await;

    assert_eq!(outcome, SendOutcome::Unauthenticated);
    assert!(vm.transcript().is_empty());
    assert!(!vm.is_pending());
    assert_eq!(vm.draft_text(), "Hello");
    assert!(backend.calls().is_empty());
    let notices = vm.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "User not authenticated");
}

#[tokio::test]
async fn test_blank_send_is_ignored() {
    let backend = Arc::new(MockBackend::new());
    let vm = view_model(&backend, logged_in());
    vm.set_draft_text("   \n\t");

    assert_eq!(vm.submit_draft().await, SendOutcome::Ignored);
    assert_eq!(vm.draft_text(), "   \n\t");
    assert!(vm.transcript().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_send_while_pending_is_dropped() {
    let backend = Arc::new(MockBackend::new());
    backend.reply(Ok(reply("first answer", "m", Some(1))));
    let gate = backend.hold("send");
    let vm = view_model(&backend, logged_in());

    let first = vm.send_message("first");
    tokio::pin!(first);
    assert!(futures::poll!(&mut first).is_pending());

    // Optimistic state while the request is out.
    let snapshot = vm.snapshot();
    assert!(snapshot.is_pending());
    assert_eq!(snapshot.transcript, vec![Message::user("first")]);
    assert_eq!(
        snapshot.send,
        SendState::Sending {
            generation: 0,
            user_index: 0
        }
    );

    vm.set_draft_text("second");
    assert_eq!(vm.send_message("second").await, SendOutcome::Ignored);
    assert_eq!(vm.transcript(), vec![Message::user("first")]);
    assert_eq!(vm.draft_text(), "second");

    gate.notify_one();
    let outcome = first.await;
    assert!(matches!(outcome, SendOutcome::Committed { .. }));
    assert_eq!(vm.transcript().len(), 2);
    assert_eq!(backend.sent().len(), 1);
    assert!(!vm.is_pending());
}

#[tokio::test]
async fn test_reply_after_switch_is_not_appended() {
    let backend = Arc::new(MockBackend::new().with_history("3", vec![record("q", "a", "m")]));
    backend.reply(Ok(reply("late answer", "m", Some(77))));
    let gate = backend.hold("send");
    let vm = view_model(&backend, logged_in());

    let send = vm.send_message("question");
    tokio::pin!(send);
    assert!(futures::poll!(&mut send).is_pending());

    vm.select_session(SessionId::Int(3)).await;
    gate.notify_one();
    send.await;

    assert_eq!(vm.active_session_id(), Some(SessionId::Int(3)));
    assert_eq!(
        vm.transcript(),
        vec![Message::user("q"), Message::assistant("a", Some("m".into()))]
    );
    assert!(!vm.is_pending());
}

#[tokio::test]
async fn test_failure_after_switch_leaves_new_transcript() {
    let backend = Arc::new(MockBackend::new().with_history("3", vec![record("q", "a", "m")]));
    backend.reply(Err("boom"));
    let gate = backend.hold("send");
    let vm = view_model(&backend, logged_in());

    let send = vm.send_message("question");
    tokio::pin!(send);
    assert!(futures::poll!(&mut send).is_pending());

    vm.select_session(SessionId::Int(3)).await;
    gate.notify_one();
    let outcome = send.await;

    assert!(matches!(outcome, SendOutcome::RolledBack { .. }));
    assert_eq!(vm.transcript().len(), 2);
}

#[tokio::test]
async fn test_transcript_reload_keeps_pending_message() {
    let backend = Arc::new(MockBackend::new().with_history("4", vec![record("old", "reply", "m")]));
    backend.reply(Ok(reply("new reply", "m", Some(4))));
    let vm = view_model(&backend, logged_in());
    vm.select_session(SessionId::Int(4)).await;

    let gate = backend.hold("send");
    let send = vm.send_message("new");
    tokio::pin!(send);
    assert!(futures::poll!(&mut send).is_pending());

    vm.load_transcript(Some(SessionId::Int(4))).await;
    assert_eq!(vm.transcript().last(), Some(&Message::user("new")));

    gate.notify_one();
    send.await;
    let texts: Vec<String> = vm.transcript().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["old", "reply", "new", "new reply"]);
}
