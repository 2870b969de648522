use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::protocol::{GenerationRequest, PositionReport};

// ---------------------------------------------------------------------------
// Position history (JSONL)
// ---------------------------------------------------------------------------

/// One generated position in `positions.jsonl`.
///
/// The report fields are stored flat next to the requested range so each
/// line reads like the backend's `data` object with a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub target_min: i64,
    pub target_max: i64,
    #[serde(flatten)]
    pub report: PositionReport,
}

impl HistoryEntry {
    pub fn new(request: &GenerationRequest, report: PositionReport) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            target_min: request.target_min(),
            target_max: request.target_max(),
            report,
        }
    }
}

pub fn history_path(state_dir: &Path) -> PathBuf {
    state_dir.join("positions.jsonl")
}

/// Append a generated position to the history log.
pub fn record(state_dir: &Path, request: &GenerationRequest, report: &PositionReport) -> Result<()> {
    let entry = HistoryEntry::new(request, report.clone());
    let path = history_path(state_dir);

    if let Some(parent) = path.parent() {
        create_dir_all(parent).context("failed to create state directory")?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let json = serde_json::to_string(&entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Every entry in the log, oldest first.
///
/// Malformed lines are skipped; a missing file is an empty history.
pub fn read_all(state_dir: &Path) -> Vec<HistoryEntry> {
    let Ok(file) = fs::File::open(history_path(state_dir)) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<HistoryEntry>(&line).ok())
        .collect()
}

/// The newest `limit` entries, newest first.
pub fn read_recent(state_dir: &Path, limit: usize) -> Vec<HistoryEntry> {
    let mut entries = read_all(state_dir);
    entries.reverse();
    entries.truncate(limit);
    entries
}
