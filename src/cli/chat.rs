// src/cli/chat.rs — Interactive REPL over the conversation view-model

use std::sync::Arc;

use super::render;
use crate::api::ChatBackend;
use crate::auth::Credentials;
use crate::conversation::{ConversationViewModel, SendOutcome, SessionId};
use crate::infra::config::Config;

/// Run the interactive chat REPL.
pub async fn run_chat(
    backend: Arc<dyn ChatBackend>,
    credentials: Credentials,
    config: &Config,
    session: Option<&str>,
) -> anyhow::Result<()> {
    if !credentials.is_authenticated() {
        eprintln!("Not logged in. Run `memchat login` (or `memchat google`) first.");
    }

    let vm = ConversationViewModel::mount(backend, credentials).await;
    let limit = config.display.preview_bullets;

    eprintln!(
        "memchat v{} | {} saved session(s) | incognito: {}\n",
        env!("CARGO_PKG_VERSION"),
        vm.sessions().len(),
        if vm.incognito() { "on" } else { "off" },
    );

    if let Some(id) = session.and_then(SessionId::parse) {
        vm.select_session(id).await;
        print_transcript(&vm, limit);
    }
    flush_notices(&vm);

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, &vm, limit).await;
            flush_notices(&vm);
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        vm.set_draft_text(trimmed);
        eprintln!("Thinking...");
        if let SendOutcome::Committed { .. } = vm.submit_draft().await {
            let transcript = vm.transcript();
            if let Some(last) = transcript.last().filter(|m| m.is_assistant()) {
                let index = transcript.len() - 1;
                println!(
                    "{}\n",
                    render::message(index, last, vm.is_expanded(index), limit)
                );
            }
        }
        flush_notices(&vm);
    }

    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

fn flush_notices(vm: &ConversationViewModel) {
    for notice in vm.take_notices() {
        eprintln!("{}", render::notice(&notice));
    }
}

fn print_transcript(vm: &ConversationViewModel, limit: usize) {
    let messages = vm.transcript();
    if messages.is_empty() {
        eprintln!("  (empty conversation)");
        return;
    }
    println!(
        "{}\n",
        render::transcript(&messages, |i| vm.is_expanded(i), limit)
    );
}

async fn handle_slash_command(input: &str, vm: &ConversationViewModel, limit: usize) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/new" => {
            vm.start_new_conversation();
            eprintln!("  Started a new conversation.");
        }

        "/sessions" => {
            vm.load_sessions().await;
            let sessions = vm.sessions();
            if sessions.is_empty() {
                eprintln!("  No saved conversations yet.");
            } else {
                let active = vm.active_session_id();
                for (i, s) in sessions.iter().enumerate() {
                    eprintln!("{}", render::session_line(i + 1, s, active.as_ref()));
                }
                eprintln!("  Usage: /open <n>");
            }
        }

        "/open" => {
            let sessions = vm.sessions();
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 && n <= sessions.len() => {
                    let session = &sessions[n - 1];
                    eprintln!("  Opening \"{}\"", session.title);
                    vm.select_session(session.id.clone()).await;
                    print_transcript(vm, limit);
                }
                _ => eprintln!("  Usage: /open <n>  (n from /sessions)"),
            }
        }

        "/more" => {
            let transcript = vm.transcript();
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 && n <= transcript.len() => {
                    let index = n - 1;
                    vm.expand(index);
                    println!("{}\n", render::message(index, &transcript[index], true, limit));
                }
                _ => eprintln!("  Usage: /more <message number>"),
            }
        }

        "/show" => print_transcript(vm, limit),

        "/incognito" => {
            let result = match arg {
                "" => Ok(()),
                "on" => vm.set_incognito(true),
                "off" => vm.set_incognito(false),
                other => {
                    eprintln!("  Expected on/off, got {}", other);
                    Ok(())
                }
            };
            match result {
                Ok(()) => eprintln!(
                    "  Incognito mode: {}",
                    if vm.incognito() { "on" } else { "off" }
                ),
                Err(e) => eprintln!("  [error] {}", e),
            }
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /new               Start a new conversation");
            eprintln!("  /sessions          List saved conversations");
            eprintln!("  /open <n>          Open conversation n from /sessions");
            eprintln!("  /more <n>          Show all bullets of message n");
            eprintln!("  /show              Reprint the current conversation");
            eprintln!("  /incognito [on|off] Show or toggle incognito mode");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  End session");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}
