//! Client-side persisted key/value state ("local storage").
//!
//! Entries are opaque strings owned by whichever flow wrote them; the only
//! operation that looks at all of them is [`LocalStore::clear`], run on
//! logout. Backed by `local-storage.json` in the state directory and written
//! through on every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store persisted at `path`. A missing or malformed file starts
    /// empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding malformed local storage");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Open `local-storage.json` inside `state_dir`.
    pub fn open_in(state_dir: &Path) -> Self {
        Self::open(state_dir.join("local-storage.json"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.entries.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Drop every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create state directory")?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write local storage {}", path.display()))
    }
}
