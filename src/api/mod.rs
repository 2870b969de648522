//! Client for the chess position backend.
//!
//! - [`ApiBase`]: the `<origin>/api` prefix, resolved once at startup.
//! - [`http`]: the [`Backend`] transport seam and its `ureq` implementation.
//! - [`ApiClient`]: typed calls on top of any [`Backend`].
//!
//! | Call            | Method | Path                        | Credentials |
//! |-----------------|--------|-----------------------------|-------------|
//! | Generate        | POST   | `/api/generate`             | none        |
//! | Check session   | GET    | `/api/auth/me`              | cookies     |
//! | Logout          | POST   | `/api/auth/logout`          | cookies     |
//! | Login           | POST   | `/api/auth/login`           | cookies     |
//! | Register        | POST   | `/api/auth/register`        | cookies     |
//! | Profile stats   | GET    | `/api/auth/stats`           | cookies     |
//! | Update profile  | PUT    | `/api/auth/update-profile`  | cookies     |
//! | Change password | PUT    | `/api/auth/change-password` | cookies     |
//! | Backend status  | GET    | `/api/status`               | none        |

pub mod cookies;
pub mod http;
pub mod protocol;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::schema::ApiConfig;
use crate::error::{ClientError, TransportError};

pub use http::{Backend, Credentials, HttpBackend};
use protocol::{
    AuthCheckResult, BackendStatus, GenerationRequest, GenerationResult, LoginRequest,
    LogoutResult, PasswordChangeRequest, PositionReport, ProfileUpdateRequest, RegisterRequest,
    StatsResult,
};

/// Endpoint paths relative to the API base.
pub mod endpoints {
    pub const GENERATE: &str = "generate";
    pub const AUTH_ME: &str = "auth/me";
    pub const AUTH_LOGOUT: &str = "auth/logout";
    pub const AUTH_LOGIN: &str = "auth/login";
    pub const AUTH_REGISTER: &str = "auth/register";
    pub const AUTH_STATS: &str = "auth/stats";
    pub const AUTH_UPDATE_PROFILE: &str = "auth/update-profile";
    pub const AUTH_CHANGE_PASSWORD: &str = "auth/change-password";
    pub const STATUS: &str = "status";
}

// ---------------------------------------------------------------------------
// Base URL
// ---------------------------------------------------------------------------

/// The API prefix every endpoint path is appended to, e.g.
/// `http://localhost:5000/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    /// Build from a backend origin (`scheme://host[:port]`).
    pub fn from_origin(origin: &str) -> Self {
        Self(format!("{}/api", origin.trim_end_matches('/')))
    }

    /// Resolve from configuration: an explicit `base_url` wins, otherwise the
    /// page host selects the local or deployed origin.
    pub fn resolve(config: &ApiConfig) -> Self {
        let explicit = config.base_url.trim();
        if !explicit.is_empty() {
            return Self::from_origin(explicit);
        }
        if is_local_host(&config.page_host) {
            Self::from_origin(&config.local_origin)
        } else {
            Self::from_origin(&config.deployed_origin)
        }
    }

    /// Full URL of an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The backend origin the prefix was built from. Session cookies are
    /// scoped to it.
    pub fn origin(&self) -> &str {
        self.0.strip_suffix("/api").unwrap_or(&self.0)
    }
}

/// Whether a page host denotes local development. A port suffix is ignored.
pub fn is_local_host(host: &str) -> bool {
    let host = host.trim();
    let name = host.rsplit_once(':').map_or(host, |(name, port)| {
        if port.chars().all(|c| c.is_ascii_digit()) {
            name
        } else {
            host
        }
    });
    matches!(name, "localhost" | "127.0.0.1")
}

// ---------------------------------------------------------------------------
// Typed client
// ---------------------------------------------------------------------------

/// Typed wrapper over a [`Backend`].
///
/// The raw-result methods (`generate`, `check_session`, `logout`, ...) keep
/// the server's `success` flag in-band so callers can render application and
/// transport failures differently. The `*_position` / `*_user` helpers fold
/// `success: false` into [`ClientError::Application`].
#[derive(Clone, Copy)]
pub struct ApiClient<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ApiClient<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// `POST /api/generate`, no credentials.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, TransportError> {
        let body = to_body(endpoints::GENERATE, request)?;
        let value = self
            .backend
            .post(endpoints::GENERATE, Some(&body), Credentials::Omit)?;
        decode(endpoints::GENERATE, value)
    }

    /// Generate and unwrap the report.
    pub fn generate_position(
        &self,
        request: &GenerationRequest,
    ) -> Result<PositionReport, ClientError> {
        let result = self.generate(request)?;
        if !result.success {
            return Err(ClientError::Application(
                result.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        result.data.ok_or_else(|| {
            TransportError::malformed(endpoints::GENERATE, "missing `data` in a successful response")
                .into()
        })
    }

    /// `GET /api/auth/me` with cookies.
    pub fn check_session(&self) -> Result<AuthCheckResult, TransportError> {
        let value = self.backend.get(endpoints::AUTH_ME, Credentials::Include)?;
        decode(endpoints::AUTH_ME, value)
    }

    /// `POST /api/auth/logout` with cookies.
    pub fn logout(&self) -> Result<LogoutResult, TransportError> {
        let value = self
            .backend
            .post(endpoints::AUTH_LOGOUT, None, Credentials::Include)?;
        decode(endpoints::AUTH_LOGOUT, value)
    }

    /// `POST /api/auth/login` with cookies.
    pub fn login(&self, request: &LoginRequest<'_>) -> Result<AuthCheckResult, TransportError> {
        let body = to_body(endpoints::AUTH_LOGIN, request)?;
        let value = self
            .backend
            .post(endpoints::AUTH_LOGIN, Some(&body), Credentials::Include)?;
        decode(endpoints::AUTH_LOGIN, value)
    }

    /// `POST /api/auth/register` with cookies.
    pub fn register(
        &self,
        request: &RegisterRequest<'_>,
    ) -> Result<AuthCheckResult, TransportError> {
        let body = to_body(endpoints::AUTH_REGISTER, request)?;
        let value =
            self.backend
                .post(endpoints::AUTH_REGISTER, Some(&body), Credentials::Include)?;
        decode(endpoints::AUTH_REGISTER, value)
    }

    /// `GET /api/auth/stats` with cookies.
    pub fn stats(&self) -> Result<StatsResult, TransportError> {
        let value = self.backend.get(endpoints::AUTH_STATS, Credentials::Include)?;
        decode(endpoints::AUTH_STATS, value)
    }

    /// `PUT /api/auth/update-profile` with cookies.
    pub fn update_profile(
        &self,
        request: &ProfileUpdateRequest<'_>,
    ) -> Result<AuthCheckResult, TransportError> {
        let body = to_body(endpoints::AUTH_UPDATE_PROFILE, request)?;
        let value = self.backend.put(
            endpoints::AUTH_UPDATE_PROFILE,
            Some(&body),
            Credentials::Include,
        )?;
        decode(endpoints::AUTH_UPDATE_PROFILE, value)
    }

    /// `PUT /api/auth/change-password` with cookies.
    pub fn change_password(
        &self,
        request: &PasswordChangeRequest<'_>,
    ) -> Result<LogoutResult, TransportError> {
        let body = to_body(endpoints::AUTH_CHANGE_PASSWORD, request)?;
        let value = self.backend.put(
            endpoints::AUTH_CHANGE_PASSWORD,
            Some(&body),
            Credentials::Include,
        )?;
        decode(endpoints::AUTH_CHANGE_PASSWORD, value)
    }

    /// `GET /api/status`, no credentials.
    pub fn status(&self) -> Result<BackendStatus, TransportError> {
        let value = self.backend.get(endpoints::STATUS, Credentials::Omit)?;
        decode(endpoints::STATUS, value)
    }
}

fn to_body<T: serde::Serialize>(endpoint: &str, body: &T) -> Result<Value, TransportError> {
    serde_json::to_value(body).map_err(|e| TransportError::malformed(endpoint, e.to_string()))
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(endpoint, error = %e, "unexpected response shape");
        TransportError::malformed(endpoint, e.to_string())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
