//! HTTP client for the nutrition backend.
//!
//! Every call has the same shape: build the request, attach
//! `Authorization: Bearer <token>` when the endpoint needs it, send JSON,
//! then branch on the status:
//!
//! - **2xx**: decode the JSON body into the caller's type.
//! - **401 on an authenticated call**: the session is cleared (forced
//!   logout) and [`ApiError::Unauthorized`] is returned so the caller can
//!   send the user back to the login screen.
//! - **other non-2xx**: [`ApiError::Status`] carrying the server's
//!   `error`/`message` text for inline display.
//! - **no response**: [`ApiError::Network`].
//!
//! Nothing is retried. Uses the synchronous `ureq` client; each request is
//! recorded in the activity log.

pub mod types;

use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::activity::ActivityLogger;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated endpoint was called without a stored token.
    #[error("not logged in")]
    NotLoggedIn,
    /// The backend rejected the token. The session has already been cleared.
    #[error("session expired, please log in again")]
    Unauthorized,
    /// Non-2xx response, with the server's message.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
    /// The backend rejected the token but it could not be removed from
    /// storage.
    #[error("session expired, but the stored token could not be removed: {0}")]
    SessionNotCleared(String),
    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Whether the caller should navigate to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::NotLoggedIn | Self::Unauthorized)
    }

    /// HTTP status when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized | Self::SessionNotCleared(_) => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for an inline notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Public,
    Bearer,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client bound to one base URL and one session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
    session: Session,
    activity: ActivityLogger,
}

impl ApiClient {
    /// Build a client. `base_url` may carry a trailing slash.
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
            session,
            activity: ActivityLogger::disabled(),
        }
    }

    /// Record every request through `logger`.
    pub fn with_activity(mut self, logger: ActivityLogger) -> Self {
        self.activity = logger;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // -- Public endpoints --

    /// `POST` without a bearer token (`/register`, `/login`).
    pub fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let resp = self.execute("POST", path, &[], Some(&body), Auth::Public)?;
        decode(path, resp)
    }

    // -- Authenticated endpoints --

    pub fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let resp = self.execute("GET", path, query, None, Auth::Bearer)?;
        decode(path, resp)
    }

    /// `GET` where a 404 means "nothing stored yet".
    pub fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ApiError> {
        match self.get(path, query) {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let resp = self.execute("POST", path, &[], Some(&body), Auth::Bearer)?;
        decode(path, resp)
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.execute("DELETE", path, &[], None, Auth::Bearer)?;
        decode(path, resp)
    }

    // -- Internal --

    fn execute(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        auth: Auth,
    ) -> Result<ureq::Response, ApiError> {
        let token = match auth {
            Auth::Public => None,
            Auth::Bearer => Some(self.session.token().ok_or(ApiError::NotLoggedIn)?),
        };

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }
        if let Some(token) = &token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let started = Instant::now();
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => {
                self.activity.record(method, path, Some(resp.status()), elapsed_ms);
                Ok(resp)
            }
            Err(ureq::Error::Status(status, resp)) => {
                self.activity.record(method, path, Some(status), elapsed_ms);

                if status == 401 && auth == Auth::Bearer {
                    // Forced logout: a rejected token must not be reused.
                    return Err(match self.session.clear() {
                        Ok(()) => ApiError::Unauthorized,
                        Err(e) => ApiError::SessionNotCleared(format!("{e:#}")),
                    });
                }

                let text = resp.into_string().unwrap_or_default();
                Err(ApiError::Status {
                    status,
                    message: error_message(status, &text),
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                self.activity.record(method, path, None, elapsed_ms);
                Err(ApiError::Network(transport.to_string()))
            }
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, resp: ureq::Response) -> Result<T, ApiError> {
    resp.into_json().map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Pull the display message out of an error body.
///
/// The backend answers `{"error": "..."}` for most failures and
/// `{"message": "..."}` for a few; anything else falls back to the status.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str())
                && !text.trim().is_empty()
            {
                return text.to_string();
            }
        }
    }

    match status {
        400 => "Bad request".to_string(),
        403 => "Forbidden".to_string(),
        404 => "Not found".to_string(),
        500..=599 => "Server error, please try again later".to_string(),
        _ => format!("Request failed with status {status}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let session = Session::new(Arc::new(MemoryStorage::new()));
        ApiClient::new(base, Duration::from_secs(1), session)
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(
            error_message(400, r#"{"error": "Missing field: name"}"#),
            "Missing field: name"
        );
        assert_eq!(
            error_message(404, r#"{"message": "Profile not found"}"#),
            "Profile not found"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(error_message(404, "<html>"), "Not found");
        assert_eq!(error_message(502, ""), "Server error, please try again later");
        assert_eq!(error_message(418, "{}"), "Request failed with status 418");
    }

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(client("http://localhost:5000/").base_url(), "http://localhost:5000");
    }

    #[test]
    fn authenticated_call_without_token_fails_fast() {
        // Port 9 (discard) is never contacted: the token check comes first.
        let client = client("http://127.0.0.1:9");
        let err = client
            .get::<serde_json::Value>("/meals/stats", &[])
            .unwrap_err();
        assert!(matches!(err, ApiError::NotLoggedIn));
        assert!(err.requires_login());
    }

    #[test]
    fn status_and_login_helpers() {
        let err = ApiError::Status {
            status: 404,
            message: "Meal not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.requires_login());
        assert_eq!(err.user_message(), "Meal not found");
        assert!(ApiError::Unauthorized.requires_login());
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
    }
}
