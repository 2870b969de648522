use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Request body for `POST /api/generate`.
///
/// The only constructor is [`GenerationRequest::new`], which enforces
/// `target_min < target_max`; an out-of-order request cannot be built and
/// therefore cannot be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    target_min: i64,
    target_max: i64,
    max_attempts: i64,
}

impl GenerationRequest {
    pub fn new(
        target_min: i64,
        target_max: i64,
        max_attempts: i64,
    ) -> Result<Self, ValidationError> {
        if target_min >= target_max {
            return Err(ValidationError::InvertedRange {
                min: target_min,
                max: target_max,
            });
        }
        Ok(Self {
            target_min,
            target_max,
            max_attempts,
        })
    }

    pub fn target_min(&self) -> i64 {
        self.target_min
    }

    pub fn target_max(&self) -> i64 {
        self.target_max
    }

    pub fn max_attempts(&self) -> i64 {
        self.max_attempts
    }
}

/// Response body of `POST /api/generate`.
///
/// A missing `success` reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub success: bool,
    pub data: Option<PositionReport>,
    pub error: Option<String>,
}

/// A generated position as reported by the backend.
///
/// Display payload only: the client renders these fields verbatim and never
/// interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub fen: String,
    pub white_material: f64,
    pub black_material: f64,
    pub material_difference: f64,
    /// Side to move, as worded by the backend (e.g. `"Blanc"`).
    pub turn: String,
    pub eval_line1: String,
    pub eval_line2: String,
    pub attempts: u64,
    pub time_seconds: f64,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// The logged-in user as returned by the auth endpoints.
///
/// The backend sends more fields (`id`, `email`, `games_played`, ...); only
/// the ones the navbar shows are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub elo: f64,
}

/// Response of `GET /api/auth/me`, `POST /api/auth/login` and
/// `POST /api/auth/register`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthCheckResult {
    #[serde(default)]
    pub success: bool,
    pub user: Option<SessionUser>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Response of `POST /api/auth/logout` and `PUT /api/auth/change-password`:
/// a verdict and a message, nothing else.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogoutResult {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Request body for `POST /api/auth/login`. `username` may also be an email.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Game statistics of the logged-in user, from `GET /api/auth/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub elo: f64,
    #[serde(default)]
    pub games_played: u64,
    #[serde(default)]
    pub games_won: u64,
    #[serde(default)]
    pub games_lost: u64,
    /// Percentage, rounded to two decimals by the backend.
    #[serde(default)]
    pub win_rate: f64,
    /// ISO 8601 account creation date.
    pub member_since: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsResult {
    #[serde(default)]
    pub success: bool,
    pub stats: Option<UserStats>,
    pub error: Option<String>,
}

/// Request body for `PUT /api/auth/update-profile`. The response is an
/// [`AuthCheckResult`] carrying the updated user.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateRequest<'a> {
    pub email: &'a str,
}

/// Request body for `PUT /api/auth/change-password`.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChangeRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Response of `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendStatus {
    #[serde(default)]
    pub stockfish_available: bool,
    pub platform: Option<String>,
    #[serde(default)]
    pub db_initialized: bool,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_inverted_and_equal_bounds() {
        assert_eq!(
            GenerationRequest::new(100, 25, 10),
            Err(ValidationError::InvertedRange { min: 100, max: 25 })
        );
        assert!(GenerationRequest::new(50, 50, 10).is_err());
        assert!(GenerationRequest::new(-100, -25, 10).is_ok());
    }

    #[test]
    fn request_serializes_three_integers() {
        let req = GenerationRequest::new(25, 100, 20_000).unwrap();
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "target_min": 25, "target_max": 100, "max_attempts": 20000 })
        );
    }

    #[test]
    fn result_without_success_reads_as_failure() {
        let result: GenerationResult =
            serde_json::from_str(r#"{ "error": "Timeout" }"#).unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Timeout"));
        assert!(result.data.is_none());
    }

    #[test]
    fn session_user_ignores_extra_fields() {
        let result: AuthCheckResult = serde_json::from_str(
            r#"{
                "success": true,
                "user": {
                    "id": 7,
                    "username": "alice",
                    "email": "alice@example.org",
                    "elo": 1500,
                    "games_played": 12
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            result.user,
            Some(SessionUser {
                username: "alice".to_string(),
                elo: 1500.0
            })
        );
    }

    #[test]
    fn stats_read_the_backend_shape() {
        let result: StatsResult = serde_json::from_str(
            r#"{
                "success": true,
                "stats": {
                    "username": "alice",
                    "elo": 1532,
                    "games_played": 10,
                    "games_won": 6,
                    "games_lost": 4,
                    "win_rate": 60.0,
                    "member_since": "2024-03-01T12:00:00"
                }
            }"#,
        )
        .unwrap();
        let stats = result.stats.unwrap();
        assert_eq!(stats.games_lost, 4);
        assert_eq!(stats.win_rate, 60.0);
        assert_eq!(stats.member_since.as_deref(), Some("2024-03-01T12:00:00"));
    }

    #[test]
    fn status_tolerates_partial_bodies() {
        let status: BackendStatus =
            serde_json::from_str(r#"{ "stockfish_available": false, "error": "boom" }"#).unwrap();
        assert!(!status.db_initialized);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }
}
