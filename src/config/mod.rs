//! Configuration system for chessgen.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: [`schema::ChessgenConfig::default()`]
//! 2. **User global config**: `~/.chessgen/config.toml`
//! 3. **Project local config**: `.chessgen.toml` in the current directory
//! 4. **Environment variables**: `CHESSGEN_*` overrides (highest precedence)
//!
//! The result is resolved once at startup and handed to the components that
//! need it; nothing re-reads configuration at runtime.

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::messages::Locale;

pub use schema::ChessgenConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// A config file that exists but could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// The resolved configuration and the files skipped while resolving it.
///
/// Loading happens before logging is initialised (the log level is itself a
/// config value), so skipped files are reported afterwards through
/// [`Loaded::log_skipped`].
#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: ChessgenConfig,
    pub skipped: Vec<SkippedFile>,
}

impl Loaded {
    pub fn log_skipped(&self) {
        for file in &self.skipped {
            tracing::warn!(
                path = %file.path.display(),
                error = %file.reason,
                "ignoring malformed config file"
            );
        }
    }
}

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> Loaded {
    let mut config = ChessgenConfig::default();
    let mut skipped = Vec::new();

    if let Some(global) = load_toml_file(global_config_path(), &mut skipped) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path(), &mut skipped) {
        config = project;
    }

    apply_env_overrides(&mut config);

    Loaded { config, skipped }
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the file is missing or malformed; a malformed file is
/// recorded in `skipped`. A broken config file never prevents the client
/// from starting.
fn load_toml_file(path: Option<PathBuf>, skipped: &mut Vec<SkippedFile>) -> Option<ChessgenConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            skipped.push(SkippedFile {
                path,
                reason: e.to_string(),
            });
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.chessgen/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chessgen").join("config.toml"))
}

/// Path to the project local config: `.chessgen.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".chessgen.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Directory holding cookies, local storage and the position history.
///
/// `storage.state_dir` when set (a leading `~/` is expanded), otherwise
/// `~/.chessgen`.
pub fn state_dir(config: &ChessgenConfig) -> Option<PathBuf> {
    let raw = config.storage.state_dir.trim();
    if raw.is_empty() {
        return dirs::home_dir().map(|home| home.join(".chessgen"));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(raw))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CHESSGEN_API_URL`: explicit backend origin
/// - `CHESSGEN_PAGE_HOST`: host used for local/deployed origin selection
/// - `CHESSGEN_LOCALE`: `fr` or `en`
/// - `CHESSGEN_STATE_DIR`: state directory
fn apply_env_overrides(config: &mut ChessgenConfig) {
    if let Ok(val) = std::env::var("CHESSGEN_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CHESSGEN_PAGE_HOST")
        && !val.is_empty()
    {
        config.api.page_host = val;
    }
    if let Ok(val) = std::env::var("CHESSGEN_LOCALE")
        && let Some(locale) = parse_locale(&val)
    {
        config.display.locale = locale;
    }
    if let Ok(val) = std::env::var("CHESSGEN_STATE_DIR")
        && !val.is_empty()
    {
        config.storage.state_dir = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a locale string.
fn parse_locale(val: &str) -> Option<Locale> {
    match val.to_ascii_lowercase().as_str() {
        "fr" | "fr-fr" | "fr_fr" => Some(Locale::Fr),
        "en" | "en-us" | "en_us" | "en-gb" | "en_gb" => Some(Locale::En),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.chessgen/config.toml`.
///
/// Fails if the file already exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.chessgen/ directory")?;
    }

    fs::write(&path, ChessgenConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `display.locale`) in the global config file.
///
/// Starts from the existing file, or from the serialized defaults when there
/// is none, so the value type of the key is always known.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ChessgenConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject writes that would no longer load as a config.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<ChessgenConfig>(&rendered)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config keys have the form <section>.<field>, got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load().config;
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn malformed_file_is_collected_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display\nlocale = ").unwrap();

        let mut skipped = Vec::new();
        assert!(load_toml_file(Some(path.clone()), &mut skipped).is_none());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, path);

        let mut none = Vec::new();
        assert!(load_toml_file(Some(dir.path().join("missing.toml")), &mut none).is_none());
        assert!(none.is_empty());
    }

    #[test]
    fn skipped_files_are_logged_once_a_subscriber_exists() {
        let loaded = Loaded {
            config: ChessgenConfig::default(),
            skipped: vec![SkippedFile {
                path: PathBuf::from("/home/alice/.chessgen/config.toml"),
                reason: "expected `]`".to_string(),
            }],
        };
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || loaded.log_skipped());

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ignoring malformed config file"), "{output}");
        assert!(output.contains("/home/alice/.chessgen/config.toml"), "{output}");
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parse_locale_handles_variants() {
        assert_eq!(parse_locale("fr"), Some(Locale::Fr));
        assert_eq!(parse_locale("FR-fr"), Some(Locale::Fr));
        assert_eq!(parse_locale("en"), Some(Locale::En));
        assert_eq!(parse_locale("en_GB"), Some(Locale::En));
        assert_eq!(parse_locale("de"), None);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str(
            r#"
[display]
locale = "fr"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "display.locale", "en").unwrap();
        assert_eq!(root["display"]["locale"].as_str(), Some("en"));
    }

    #[test]
    fn set_toml_value_updates_bool_and_integer() {
        let mut root: toml::Value = toml::from_str(
            r#"
[display]
color = true

[generation]
max_attempts = 20000
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "display.color", "off").unwrap();
        set_toml_value(&mut root, "generation.max_attempts", "500").unwrap();
        assert_eq!(root["display"]["color"].as_bool(), Some(false));
        assert_eq!(root["generation"]["max_attempts"].as_integer(), Some(500));
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value = toml::from_str("[generation]\ntarget_min = 25\n").unwrap();
        assert!(set_toml_value(&mut root, "generation.target_min", "abc").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[api]\npage_host = \"localhost\"\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "api.nope", "value").is_err());
        assert!(set_toml_value(&mut root, "api", "value").is_err());
    }

    #[test]
    fn state_dir_prefers_configured_path() {
        let mut config = ChessgenConfig::default();
        config.storage.state_dir = "/tmp/chessgen-state".to_string();
        assert_eq!(
            state_dir(&config),
            Some(PathBuf::from("/tmp/chessgen-state"))
        );
    }

    #[test]
    fn state_dir_defaults_under_home() {
        let config = ChessgenConfig::default();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(state_dir(&config), Some(home.join(".chessgen")));
        }
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: ChessgenConfig = toml::from_str(&toml_str).unwrap();
    }
}
