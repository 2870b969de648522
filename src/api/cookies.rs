//! Persisted cookie jar for credentialed requests, scoped by backend origin.
//!
//! Each backend origin (`scheme://host[:port]`) owns its own set of cookies,
//! and a request only ever carries the cookies its own origin set. Within an
//! origin only the `name=value` pair of each `Set-Cookie` header is kept.
//! Deletion follows the usual conventions: an empty value, `Max-Age=0` (or
//! negative), or an `Expires` date in the past.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

type OriginCookies = BTreeMap<String, String>;

/// Session cookies, grouped by the origin that set them.
#[derive(Debug, Default)]
pub struct CookieJar {
    path: Option<PathBuf>,
    origins: BTreeMap<String, OriginCookies>,
}

impl CookieJar {
    /// A jar that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the jar persisted at `path`. A missing, unreadable or
    /// unrecognised file yields an empty jar bound to the same path.
    pub fn open(path: PathBuf) -> Self {
        let origins = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path: Some(path),
            origins,
        }
    }

    /// Value of the `Cookie` request header for `origin`, if it has cookies.
    pub fn header(&self, origin: &str) -> Option<String> {
        let cookies = self.origins.get(&origin_key(origin))?;
        if cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }

    pub fn get(&self, origin: &str, name: &str) -> Option<&str> {
        self.origins
            .get(&origin_key(origin))?
            .get(name)
            .map(String::as_str)
    }

    /// Whether no origin holds any cookie.
    pub fn is_empty(&self) -> bool {
        self.origins.values().all(BTreeMap::is_empty)
    }

    /// Apply the `Set-Cookie` headers of a response from `origin`. Returns
    /// whether the jar changed.
    pub fn absorb<S: AsRef<str>>(&mut self, origin: &str, set_cookie_headers: &[S]) -> bool {
        let key = origin_key(origin);
        let mut changed = false;
        for header in set_cookie_headers {
            let Some(cookie) = parse_set_cookie(header.as_ref()) else {
                continue;
            };
            if cookie.expired {
                if let Some(cookies) = self.origins.get_mut(&key) {
                    changed |= cookies.remove(&cookie.name).is_some();
                }
            } else {
                let cookies = self.origins.entry(key.clone()).or_default();
                if cookies.get(&cookie.name) != Some(&cookie.value) {
                    cookies.insert(cookie.name, cookie.value);
                    changed = true;
                }
            }
        }
        self.origins.retain(|_, cookies| !cookies.is_empty());
        changed
    }

    /// Persist the jar to its file (no-op for in-memory jars).
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create state directory")?;
        }
        let json = serde_json::to_string_pretty(&self.origins)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write cookie jar {}", path.display()))
    }
}

/// Scheme and host compare case-insensitively; a trailing slash is ignored.
fn origin_key(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

struct ParsedCookie {
    name: String,
    value: String,
    expired: bool,
}

fn parse_set_cookie(header: &str) -> Option<ParsedCookie> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');

    let mut expired = value.is_empty();
    for attribute in parts {
        let Some((key, attr_value)) = attribute.split_once('=') else {
            continue;
        };
        let attr_value = attr_value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "max-age" => {
                if attr_value.parse::<i64>().is_ok_and(|secs| secs <= 0) {
                    expired = true;
                }
            }
            "expires" => {
                if let Ok(when) = DateTime::parse_from_rfc2822(attr_value)
                    && when.with_timezone(&Utc) <= Utc::now()
                {
                    expired = true;
                }
            }
            _ => {}
        }
    }

    Some(ParsedCookie {
        name: name.to_string(),
        value: value.to_string(),
        expired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = "http://localhost:5000";
    const DEPLOYED: &str = "https://api.chessgen.app";

    #[test]
    fn absorbs_session_cookie_and_builds_header() {
        let mut jar = CookieJar::in_memory();
        assert!(jar.header(LOCAL).is_none());

        let changed = jar.absorb(LOCAL, &["session=abc.def; HttpOnly; Path=/; SameSite=Lax"]);
        assert!(changed);
        assert_eq!(jar.get(LOCAL, "session"), Some("abc.def"));
        assert_eq!(jar.header(LOCAL).as_deref(), Some("session=abc.def"));
    }

    #[test]
    fn header_joins_multiple_cookies() {
        let mut jar = CookieJar::in_memory();
        jar.absorb(LOCAL, &["b=2", "a=1"]);
        assert_eq!(jar.header(LOCAL).as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn cookies_stay_with_the_origin_that_set_them() {
        let mut jar = CookieJar::in_memory();
        jar.absorb(LOCAL, &["session=local-secret"]);

        assert!(jar.header(DEPLOYED).is_none());
        assert!(jar.get(DEPLOYED, "session").is_none());
        assert!(jar.header("http://localhost:5001").is_none());
        assert_eq!(
            jar.header("HTTP://LOCALHOST:5000/").as_deref(),
            Some("session=local-secret")
        );

        jar.absorb(DEPLOYED, &["session=deployed-secret"]);
        assert_eq!(jar.get(LOCAL, "session"), Some("local-secret"));
        assert_eq!(jar.get(DEPLOYED, "session"), Some("deployed-secret"));
    }

    #[test]
    fn expiry_only_touches_its_own_origin() {
        let mut jar = CookieJar::in_memory();
        jar.absorb(LOCAL, &["session=abc"]);
        jar.absorb(DEPLOYED, &["session=xyz"]);

        let changed = jar.absorb(
            LOCAL,
            &["session=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/"],
        );
        assert!(changed);
        assert!(jar.header(LOCAL).is_none());
        assert_eq!(jar.get(DEPLOYED, "session"), Some("xyz"));

        assert!(!jar.absorb("http://elsewhere:1", &["session=; Max-Age=0"]));
        jar.absorb(DEPLOYED, &["session=; Max-Age=0"]);
        assert!(jar.is_empty());
    }

    #[test]
    fn max_age_zero_removes_even_with_value() {
        let mut jar = CookieJar::in_memory();
        jar.absorb(LOCAL, &["session=abc"]);
        jar.absorb(LOCAL, &["session=stale; Max-Age=0"]);
        assert!(jar.get(LOCAL, "session").is_none());
    }

    #[test]
    fn ignores_garbage_headers() {
        let mut jar = CookieJar::in_memory();
        assert!(!jar.absorb(LOCAL, &["no-equals-sign", "=value-without-name"]));
        assert!(jar.is_empty());
    }

    #[test]
    fn persists_and_reloads_per_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let mut jar = CookieJar::open(path.clone());
        jar.absorb(LOCAL, &["session=xyz; Path=/"]);
        jar.save().unwrap();

        let reloaded = CookieJar::open(path);
        assert_eq!(reloaded.get(LOCAL, "session"), Some("xyz"));
        assert!(reloaded.header(DEPLOYED).is_none());
    }

    #[test]
    fn unscoped_legacy_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, r#"{"session":"abc"}"#).unwrap();

        let jar = CookieJar::open(path);
        assert!(jar.is_empty());
    }
}
