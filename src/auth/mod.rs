//! Login, registration and profile changes, with the backend's own field
//! rules checked before anything is sent.

use std::sync::LazyLock;

use regex::Regex;

use crate::api::ApiClient;
use crate::api::protocol::{
    AuthCheckResult, LoginRequest, PasswordChangeRequest, ProfileUpdateRequest, RegisterRequest,
    SessionUser, UserStats,
};
use crate::error::{ClientError, TransportError, ValidationError};
use crate::storage::LocalStore;

/// Local storage key holding the logged-in user as JSON.
pub const USER_KEY: &str = "user";

pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]{3,20}$").unwrap_or_else(|e| panic!("invalid username regex: {e}"))
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Missing { field: "username" });
    }
    if password.is_empty() {
        return Err(ValidationError::Missing { field: "password" });
    }
    Ok(())
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::Username);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::Email);
    }
    validate_password_length(password)
}

fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(ValidationError::PasswordLength {
            min: PASSWORD_MIN,
            max: PASSWORD_MAX,
        });
    }
    Ok(())
}

/// Normalise a new email the way the backend stores it (trimmed, lower
/// case) and check its shape.
pub fn validate_email_change(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::Missing { field: "email" });
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::Email);
    }
    Ok(email)
}

pub fn validate_password_change(current: &str, new: &str) -> Result<(), ValidationError> {
    if current.is_empty() {
        return Err(ValidationError::Missing {
            field: "current_password",
        });
    }
    if new.is_empty() {
        return Err(ValidationError::Missing {
            field: "new_password",
        });
    }
    validate_password_length(new)
}

/// Log in with a username or email. On success the session cookie is kept by
/// the backend transport and the user is written to local storage.
pub fn login(
    api: &ApiClient<'_>,
    storage: &mut LocalStore,
    username: &str,
    password: &str,
) -> Result<SessionUser, ClientError> {
    let username = username.trim();
    validate_login(username, password)?;
    let result = api.login(&LoginRequest { username, password })?;
    remember(storage, "auth/login", result)
}

/// Create an account. The backend logs the new user in directly.
pub fn register(
    api: &ApiClient<'_>,
    storage: &mut LocalStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<SessionUser, ClientError> {
    let username = username.trim();
    let email = email.trim();
    validate_registration(username, email, password)?;
    let result = api.register(&RegisterRequest {
        username,
        email,
        password,
    })?;
    remember(storage, "auth/register", result)
}

/// Statistics of the logged-in user.
pub fn stats(api: &ApiClient<'_>) -> Result<UserStats, ClientError> {
    let result = api.stats()?;
    if !result.success {
        return Err(refused("auth/stats", result.error));
    }
    result.stats.ok_or_else(|| {
        TransportError::malformed("auth/stats", "missing `stats` in a successful response").into()
    })
}

/// Change the account email. The stored user is refreshed from the answer.
pub fn update_email(
    api: &ApiClient<'_>,
    storage: &mut LocalStore,
    email: &str,
) -> Result<SessionUser, ClientError> {
    let email = validate_email_change(email)?;
    let result = api.update_profile(&ProfileUpdateRequest { email: &email })?;
    remember(storage, "auth/update-profile", result)
}

/// Change the account password. Returns the backend's confirmation message.
pub fn change_password(
    api: &ApiClient<'_>,
    current: &str,
    new: &str,
) -> Result<Option<String>, ClientError> {
    validate_password_change(current, new)?;
    let result = api.change_password(&PasswordChangeRequest {
        current_password: current,
        new_password: new,
    })?;
    if !result.success {
        return Err(refused("auth/change-password", result.error));
    }
    tracing::info!("password changed");
    Ok(result.message)
}

fn refused(endpoint: &str, error: Option<String>) -> ClientError {
    let error = error.unwrap_or_else(|| "unknown error".to_string());
    tracing::warn!(endpoint, %error, "request refused");
    ClientError::Application(error)
}

fn remember(
    storage: &mut LocalStore,
    endpoint: &str,
    result: AuthCheckResult,
) -> Result<SessionUser, ClientError> {
    if !result.success {
        return Err(refused(endpoint, result.error));
    }
    let user = result
        .user
        .ok_or_else(|| TransportError::malformed(endpoint, "missing `user` in a successful response"))?;

    match serde_json::to_string(&user) {
        Ok(json) => {
            if let Err(e) = storage.set(USER_KEY, json) {
                tracing::warn!(error = %e, "failed to persist user");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to serialize user"),
    }
    tracing::info!(endpoint, username = %user.username, "user stored");
    Ok(user)
}

/// The user stored by the last successful login, if any.
pub fn stored_user(storage: &LocalStore) -> Option<SessionUser> {
    serde_json::from_str(storage.get(USER_KEY)?).ok()
}
