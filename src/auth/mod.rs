//! Registration, login and logout.
//!
//! Forms are validated locally first; invalid input never reaches the
//! network. On a successful login the token and a preferences blob are
//! persisted through the [`Session`](crate::session::Session).

use anyhow::Result;
use thiserror::Error;

use crate::api::types::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use crate::api::{ApiClient, ApiError};
use crate::session::{Session, UserPreferences};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A form field failed local validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Please enter your password")]
    MissingPassword,
}

/// Outcome of a form submission: either the form was rejected locally or the
/// backend call failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not save the session: {0}")]
    Storage(anyhow::Error),
}

impl AuthError {
    /// Text for the inline message area under the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
            Self::Storage(e) => format!("Logged in, but the session could not be saved: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Second password field; checked only when present.
    pub confirm_password: Option<String>,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if let Some(confirm) = &self.confirm_password
            && confirm != &self.password
        {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Submit the registration form: one `POST /register`.
///
/// Returns the success message to display. The name/email pair is cached so
/// the dashboard can greet the user by name after their first login.
pub fn register(client: &ApiClient, form: &RegistrationForm) -> Result<String, AuthError> {
    form.validate()?;

    let email = form.email.trim();
    let body = RegisterRequest {
        name: form.name.trim(),
        email,
        password: &form.password,
    };
    let resp: MessageResponse = client.post_public("/register", &body)?;

    let prefs = UserPreferences::new(Some(form.name.trim().to_string()), email);
    let _ = client.session().set_preferences(&prefs);

    Ok(if resp.message.is_empty() {
        "Registration successful! Please log in.".to_string()
    } else {
        resp.message
    })
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        Ok(())
    }
}

/// Submit the login form and persist the session.
///
/// The cached display name survives when the same email logs in again.
pub fn login(client: &ApiClient, form: &LoginForm) -> Result<UserPreferences, AuthError> {
    form.validate()?;

    let email = form.email.trim();
    let body = LoginRequest {
        email,
        password: &form.password,
    };
    let resp: LoginResponse = client.post_public("/login", &body)?;

    let session = client.session();
    let name = session
        .preferences()
        .filter(|p| p.email.eq_ignore_ascii_case(email))
        .and_then(|p| p.name);
    let prefs = UserPreferences::new(name, email);

    session
        .store_login(&resp.token, prefs)
        .map_err(AuthError::Storage)?;

    Ok(session.preferences().unwrap_or_else(|| UserPreferences::new(None, email)))
}

/// Forget the token and the cached preferences.
pub fn logout(session: &Session) -> Result<()> {
    session.clear()
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
