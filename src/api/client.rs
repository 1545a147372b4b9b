// src/api/client.rs — reqwest client for the chat backend

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{AuthRequest, AuthToken, ChatReply, ChatRequest, HistoryRecord, Session, SessionId};
use super::ChatBackend;
use crate::auth::oauth::GoogleLogin;
use crate::infra::errors::ClientError;

const SESSIONS_PATH: &str = "api/v1/sessions/";
const MEMORY_PATH: &str = "api/v1/memory/";
const CHAT_PATH: &str = "api/v1/chat/route";
const LOGIN_PATH: &str = "auth/login";
const REGISTER_PATH: &str = "auth/register";
const GOOGLE_LOGIN_PATH: &str = "auth/google/login";

/// HTTP+JSON client. No timeouts are set here; the transport defaults apply.
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("Invalid backend URL '{base_url}': {e}")))?;
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint '{path}': {e}")))
    }

    /// `POST /auth/login` with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ClientError> {
        let url = self.endpoint(LOGIN_PATH)?;
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(&AuthRequest { email, password })
            .send()
            .await?;
        decode(response, "Login failed").await
    }

    /// `POST /auth/register` with email and password.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthToken, ClientError> {
        let url = self.endpoint(REGISTER_PATH)?;
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(&AuthRequest { email, password })
            .send()
            .await?;
        decode(response, "Registration failed").await
    }

    /// Ask the backend where to send the user for Google sign-in.
    pub async fn google_login_url(&self) -> Result<String, ClientError> {
        let url = self.endpoint(GOOGLE_LOGIN_PATH)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let login: GoogleLogin =
            decode(response, "Could not get Google login URL from server.").await?;
        Ok(login.authorization_url)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_sessions(&self, token: &str) -> Result<Vec<Session>, ClientError> {
        let url = self.endpoint(SESSIONS_PATH)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).bearer_auth(token).send().await?;
        decode(response, "Failed to fetch sessions").await
    }

    async fn history(
        &self,
        token: &str,
        session_id: Option<&SessionId>,
    ) -> Result<Vec<HistoryRecord>, ClientError> {
        let mut url = self.endpoint(MEMORY_PATH)?;
        if let Some(id) = session_id {
            url.query_pairs_mut()
                .append_pair("session_id", &id.to_string());
        }
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).bearer_auth(token).send().await?;
        decode(response, "Couldn't load persistent memory").await
    }

    async fn send(&self, token: &str, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        let url = self.endpoint(CHAT_PATH)?;
        tracing::debug!(
            "POST {} (session: {:?}, incognito: {})",
            url,
            request.session_id,
            request.incognito
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        decode(response, "Something went wrong").await
    }
}

/// Map a response to `T`. Non-2xx becomes `Http` with the backend's
/// `detail` when it sent one, otherwise `fallback`.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body).unwrap_or_else(|| fallback.to_string());
        tracing::warn!("Backend returned {}: {}", status, message);
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

/// `{"detail": "..."}`, or the `msg` fields of a validation-error list.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match &value["detail"] {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items.iter().filter_map(|i| i["msg"].as_str()).collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
