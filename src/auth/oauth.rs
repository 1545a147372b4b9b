// src/auth/oauth.rs — Google sign-in via the backend
//
// The backend runs the whole OAuth dance. The client only asks it for the
// provider's authorization URL and, after the browser round-trip, picks the
// issued token out of the callback redirect.

use serde::Deserialize;

use crate::infra::errors::ClientError;

/// Body of `GET /auth/google/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleLogin {
    pub authorization_url: String,
}

/// Extract the `token` query parameter from the callback redirect URL.
pub fn token_from_redirect(redirect: &str) -> Result<String, ClientError> {
    let failed = || {
        ClientError::Validation("Google authentication failed. Please try again.".into())
    };
    let url = url::Url::parse(redirect.trim()).map_err(|_| failed())?;
    url.query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .filter(|t| !t.is_empty())
        .ok_or_else(failed)
}
