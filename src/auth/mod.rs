// src/auth/mod.rs — Credential token and incognito flag
//
// Both live in the injected key-value store under fixed keys, exactly as
// the backend's web client keeps them in local storage.

pub mod forms;
pub mod oauth;

use std::sync::Arc;

use crate::infra::errors::ClientError;
use crate::storage::KeyValueStore;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the incognito preference (`"true"` / `"false"`).
pub const INCOGNITO_KEY: &str = "incognitoMode";

/// Typed accessors over the durable key-value store.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KeyValueStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored bearer token. Blank values count as absent.
    pub fn token(&self) -> Option<String> {
        self.store
            .get(TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
    }

    pub fn set_token(&self, token: &str) -> Result<(), ClientError> {
        if token.trim().is_empty() {
            return Err(ClientError::Validation("Refusing to store an empty token".into()));
        }
        self.store.set(TOKEN_KEY, token)
    }

    /// Log out: forget the token. Other keys are left alone.
    pub fn clear_token(&self) -> Result<(), ClientError> {
        self.store.remove(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Read at send time; only the exact string `"true"` enables it.
    pub fn incognito(&self) -> bool {
        self.store.get(INCOGNITO_KEY).as_deref() == Some("true")
    }

    pub fn set_incognito(&self, enabled: bool) -> Result<(), ClientError> {
        self.store
            .set(INCOGNITO_KEY, if enabled { "true" } else { "false" })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("authenticated", &self.is_authenticated())
            .field("incognito", &self.incognito())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn creds(store: MemoryStore) -> Credentials {
        Credentials::new(Arc::new(store))
    }

    #[test]
    fn test_token_roundtrip_and_logout() {
        let c = creds(MemoryStore::new());
        assert!(!c.is_authenticated());

        c.set_token("jwt-abc").unwrap();
        assert_eq!(c.token().as_deref(), Some("jwt-abc"));

        c.clear_token().unwrap();
        assert!(c.token().is_none());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let c = creds(MemoryStore::with_entries([(TOKEN_KEY, "  ")]));
        assert!(c.token().is_none());
        assert!(c.set_token("").is_err());
    }

    #[test]
    fn test_incognito_only_exact_true() {
        let c = creds(MemoryStore::new());
        assert!(!c.incognito());

        c.set_incognito(true).unwrap();
        assert!(c.incognito());

        c.set_incognito(false).unwrap();
        assert!(!c.incognito());

        let odd = creds(MemoryStore::with_entries([(INCOGNITO_KEY, "TRUE")]));
        assert!(!odd.incognito());
    }

    #[test]
    fn test_logout_keeps_incognito() {
        let c = creds(MemoryStore::new());
        c.set_token("t").unwrap();
        c.set_incognito(true).unwrap();
        c.clear_token().unwrap();
        assert!(c.incognito());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let c = creds(MemoryStore::with_entries([(TOKEN_KEY, "super-secret")]));
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("authenticated: true"));
    }
}
