// src/cli/render.rs — Plain-text rendering of sessions and transcripts

use crate::conversation::{preview, Message, Notice, NoticeLevel, Sender, Session, SessionId};

/// One line of the session list. Numbers are 1-based for `/open <n>`.
pub fn session_line(number: usize, session: &Session, active: Option<&SessionId>) -> String {
    let marker = if active == Some(&session.id) { "*" } else { " " };
    let title = if session.title.trim().is_empty() {
        "(untitled)"
    } else {
        session.title.as_str()
    };
    match session.last_updated {
        Some(ts) => format!(
            "{marker} {number:>3}. {title}  [id {}, {}]",
            session.id,
            ts.format("%Y-%m-%d %H:%M")
        ),
        None => format!("{marker} {number:>3}. {title}  [id {}]", session.id),
    }
}

/// Render message `index` of a transcript. Collapsed assistant messages
/// end with a `/more` hint naming the 1-based message number.
pub fn message(index: usize, message: &Message, expanded: bool, limit: usize) -> String {
    match message.sender {
        Sender::User => format!("> {}", message.text),
        Sender::Assistant => {
            let shown = preview(&message.text, expanded, limit);
            let mut out = String::from("Assistant");
            for bullet in &shown.bullets {
                out.push_str("\n  • ");
                out.push_str(bullet);
            }
            if shown.hidden > 0 {
                out.push_str(&format!(
                    "\n  … {} more (/more {})",
                    shown.hidden,
                    index + 1
                ));
            }
            if let Some(model) = &message.model_used {
                out.push_str(&format!("\n  Answered by: {model}"));
            }
            out
        }
    }
}

pub fn transcript(
    messages: &[Message],
    is_expanded: impl Fn(usize) -> bool,
    limit: usize,
) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| message(i, m, is_expanded(i), limit))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => notice.message.clone(),
        NoticeLevel::Error => format!("[error] {}", notice.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_line_marks_active() {
        let s = Session {
            id: SessionId::Int(12),
            title: "Borrowing".into(),
            last_updated: Some(chrono::Utc.with_ymd_and_hms(2026, 3, 1, 10, 5, 0).unwrap()),
        };
        assert_eq!(
            session_line(1, &s, Some(&SessionId::Int(12))),
            "*   1. Borrowing  [id 12, 2026-03-01 10:05]"
        );
        assert_eq!(session_line(2, &s, None), "    2. Borrowing  [id 12, 2026-03-01 10:05]");
    }

    #[test]
    fn test_untitled_session() {
        let s = Session {
            id: SessionId::Str("abc".into()),
            title: " ".into(),
            last_updated: None,
        };
        assert_eq!(session_line(3, &s, None), "    3. (untitled)  [id abc]");
    }

    #[test]
    fn test_collapsed_assistant_message() {
        let m = Message::assistant("A one. B two. C three. D four.", Some("gpt".into()));
        assert_eq!(
            message(1, &m, false, 3),
            "Assistant\n  • A one.\n  • B two.\n  • C three.\n  … 1 more (/more 2)\n  Answered by: gpt"
        );
    }

    #[test]
    fn test_expanded_assistant_message() {
        let m = Message::assistant("A one. B two.", None);
        assert_eq!(message(0, &m, true, 1), "Assistant\n  • A one.\n  • B two.");
    }

    #[test]
    fn test_transcript_joins_messages() {
        let msgs = vec![Message::user("Hi"), Message::assistant("Hello.", None)];
        assert_eq!(
            transcript(&msgs, |_| false, 3),
            "> Hi\n\nAssistant\n  • Hello."
        );
    }

    #[test]
    fn test_error_notice_prefix() {
        let n = Notice {
            level: NoticeLevel::Error,
            message: "boom".into(),
        };
        assert_eq!(notice(&n), "[error] boom");
    }
}
