// src/infra/errors.rs — Error types for memchat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    // Auth
    #[error("User not authenticated. Run `memchat login` first.")]
    Unauthenticated,

    // Backend errors
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Cannot reach backend: {0}")]
    Transport(String),

    #[error("Unexpected response from backend: {0}")]
    MalformedResponse(String),

    // User errors
    #[error("{0}")]
    Validation(String),

    // Infra
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// True when the failure means the stored credential is missing or
    /// rejected, so the user has to sign in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::Http { status: 401, .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::MalformedResponse(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
