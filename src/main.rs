// src/main.rs — memchat entry point

use std::sync::Arc;

use clap::Parser;

use memchat::api::{ChatBackend, HttpBackend};
use memchat::auth::Credentials;
use memchat::cli::{account, chat, history, Cli, Commands};
use memchat::infra::config::Config;
use memchat::infra::logger;
use memchat::storage::file::FileStore;

#[tokio::main]
async fn main() {
    // Initialize logging (respects MEMCHAT_LOG / RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    let store = FileStore::open(config.storage.resolved_path())?;
    tracing::debug!("Using key-value store at {}", store.path().display());
    let credentials = Credentials::new(Arc::new(store));
    let backend = Arc::new(HttpBackend::new(&config.backend.base_url)?);

    match cli.command {
        Some(Commands::Login { email, password }) => {
            account::run_login(&backend, &credentials, email, password).await
        }
        Some(Commands::Signup {
            name,
            email,
            password,
        }) => account::run_signup(&backend, &credentials, name, email, password).await,
        Some(Commands::Google) => account::run_google(&backend).await,
        Some(Commands::Callback { url }) => account::run_callback(&credentials, &url),
        Some(Commands::Logout) => account::run_logout(&credentials),
        Some(Commands::Incognito { mode }) => account::run_incognito(&credentials, mode),
        Some(Commands::Sessions) => history::run_sessions(backend.as_ref(), &credentials).await,
        Some(Commands::History { session }) => {
            history::run_history(
                backend.as_ref(),
                &credentials,
                session.as_deref(),
                config.display.preview_bullets,
            )
            .await
        }
        Some(Commands::Chat { session }) => {
            let backend: Arc<dyn ChatBackend> = backend;
            chat::run_chat(backend, credentials, &config, session.as_deref()).await
        }
        None => {
            let backend: Arc<dyn ChatBackend> = backend;
            chat::run_chat(backend, credentials, &config, None).await
        }
    }
}
