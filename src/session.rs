//! Client session: bearer token plus the cached user-preferences blob.
//!
//! Both live in [`Storage`] under fixed keys. The preferences are a display
//! cache only; the backend stays authoritative for everything.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the [`UserPreferences`] JSON blob.
pub const PREFERENCES_KEY: &str = "userPreferences";

/// Cached identity shown in headers and greetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn new(name: Option<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            email: email.into(),
            last_login: None,
        }
    }

    /// Name when known, otherwise the local part of the email.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) => name,
            None => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Handle over the persisted session. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The stored bearer token, if any. Blank tokens count as absent.
    pub fn token(&self) -> Option<String> {
        self.storage
            .get_item(TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Cached preferences. A malformed blob reads as absent.
    pub fn preferences(&self) -> Option<UserPreferences> {
        let raw = self.storage.get_item(PREFERENCES_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_preferences(&self, prefs: &UserPreferences) -> Result<()> {
        let json = serde_json::to_string(prefs).context("failed to serialize preferences")?;
        self.storage.set_item(PREFERENCES_KEY, &json)
    }

    /// Persist a successful login.
    pub fn store_login(&self, token: &str, mut prefs: UserPreferences) -> Result<()> {
        prefs.last_login = Some(Utc::now());
        self.storage
            .set_item(TOKEN_KEY, token)
            .context("failed to store session token")?;
        self.set_preferences(&prefs)
    }

    /// Drop the token and the preferences blob.
    ///
    /// Both removals are attempted; the first failure is returned.
    pub fn clear(&self) -> Result<()> {
        let token = self.storage.remove_item(TOKEN_KEY);
        let prefs = self.storage.remove_item(PREFERENCES_KEY);
        token.and(prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn session() -> (Arc<MemoryStorage>, Session) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), Session::new(storage))
    }

    #[test]
    fn store_login_then_clear() {
        let (storage, session) = session();
        assert!(!session.is_authenticated());

        session
            .store_login("jwt-1", UserPreferences::new(Some("Ada".into()), "ada@example.com"))
            .unwrap();
        assert_eq!(session.token().as_deref(), Some("jwt-1"));
        let prefs = session.preferences().unwrap();
        assert_eq!(prefs.display_name(), "Ada");
        assert!(prefs.last_login.is_some());

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.preferences().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn blank_token_is_not_authenticated() {
        let (storage, session) = session();
        storage.set_item(TOKEN_KEY, "  ").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let prefs = UserPreferences::new(Some("   ".into()), "grace@example.com");
        assert_eq!(prefs.display_name(), "grace");
    }

    #[test]
    fn preferences_blob_uses_camel_case() {
        let (storage, session) = session();
        let mut prefs = UserPreferences::new(None, "x@example.com");
        prefs.last_login = None;
        session.set_preferences(&prefs).unwrap();
        let raw = storage.get_item(PREFERENCES_KEY).unwrap();
        assert!(raw.contains("\"email\":\"x@example.com\""));
        assert!(!raw.contains("lastLogin"));
    }

    #[test]
    fn malformed_preferences_read_as_none() {
        let (storage, session) = session();
        storage.set_item(PREFERENCES_KEY, "not json").unwrap();
        assert!(session.preferences().is_none());
    }
}
