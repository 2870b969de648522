//! Configuration schema and defaults for the chessgen client.
//!
//! Defines the TOML-serializable structure with the sections `[api]`,
//! `[generation]`, `[display]`, `[storage]` and `[logging]`. Every field has
//! a built-in default; users only set what they want to override.

use serde::{Deserialize, Serialize};

use crate::messages::Locale;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level chessgen configuration.
///
/// Maps to `~/.chessgen/config.toml` and `.chessgen.toml`. Missing sections
/// and fields fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessgenConfig {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub display: DisplayConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Where the backend lives.
///
/// The API base is resolved once at startup: a non-empty `base_url` wins,
/// otherwise `page_host` picks between the local and the deployed origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host the client considers itself served from. `localhost` and
    /// `127.0.0.1` select `local_origin`; anything else `deployed_origin`.
    pub page_host: String,
    /// Origin of the local development backend.
    pub local_origin: String,
    /// Origin of the deployed backend.
    pub deployed_origin: String,
    /// Explicit origin override. Empty means "resolve from `page_host`".
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            page_host: "localhost".to_string(),
            local_origin: "http://localhost:5000".to_string(),
            deployed_origin: "https://api.chessgen.app".to_string(),
            base_url: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// [generation]
// ---------------------------------------------------------------------------

/// Default form values for the generation panel.
///
/// These mirror the backend's own fallbacks for a request body that omits
/// the fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Lower bound of the evaluation window, in centipawns.
    pub target_min: i64,
    /// Upper bound of the evaluation window, in centipawns.
    pub target_max: i64,
    /// Number of random candidates the backend may try.
    pub max_attempts: i64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_min: 25,
            target_max: 100,
            max_attempts: 20_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// UI language and number formatting: `"fr"` or `"en"`.
    pub locale: Locale,
    /// Colored terminal output.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

/// Client-side persisted state (cookies, local storage, history).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the state files. Empty means `~/.chessgen`.
    pub state_dir: String,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback `tracing` filter when neither `RUST_LOG` nor `CHESSGEN_LOG`
    /// is set: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ChessgenConfig {
    /// Annotated default config file content, written by `chessgen config init`.
    pub fn default_toml() -> String {
        r#"# chessgen configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CHESSGEN_*)
#   2. Project config (.chessgen.toml in current directory)
#   3. User global config (~/.chessgen/config.toml)
#   4. Built-in defaults

[api]
page_host = "localhost"                       # localhost / 127.0.0.1 -> local_origin
local_origin = "http://localhost:5000"
deployed_origin = "https://api.chessgen.app"
base_url = ""                                 # Explicit override (CHESSGEN_API_URL)

[generation]
target_min = 25
target_max = 100
max_attempts = 20000

[display]
locale = "fr"   # fr | en
color = true

[storage]
state_dir = ""  # Empty -> ~/.chessgen

[logging]
level = "warn"  # RUST_LOG / CHESSGEN_LOG take precedence
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
