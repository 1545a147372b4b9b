// src/cli/mod.rs — CLI definition (clap derive)

pub mod account;
pub mod chat;
pub mod history;
pub mod render;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "memchat", about = "Chat client with persistent memory", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat session (default)
    Chat {
        /// Resume a saved session by id
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Prompted (masked) when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        /// Full name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Prompted (masked, with confirmation) when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Print the Google sign-in URL
    Google,
    /// Finish Google sign-in from the URL the browser was redirected to
    Callback {
        /// Full redirect URL, including `?token=...`
        url: String,
    },
    /// Forget the stored credential
    Logout,
    /// Show or set incognito mode (conversations are not saved)
    Incognito {
        #[arg(value_enum)]
        mode: Option<Toggle>,
    },
    /// List saved conversations
    Sessions,
    /// Print stored history (all sessions when no id is given)
    History {
        #[arg(short, long)]
        session: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
