use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Activity log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the API activity log (`~/.nutriboard/activity.jsonl`).
///
/// One line per backend request, successful or not. Used by
/// `nutriboard activity` for aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub method: String,
    /// Request path with ids collapsed, e.g. `/meal/delete/:id`.
    pub endpoint: String,
    /// HTTP status, absent when the request never got a response.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub latency_ms: u64,
    #[serde(default)]
    pub success: bool,
}

/// Collapse id segments so requests group by route.
///
/// `/meal/delete/65f1c2` → `/meal/delete/:id`, `/food/details/4881` →
/// `/food/details/:id`. The query string is dropped.
pub fn normalize_endpoint(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    let mut segments: Vec<&str> = path.split('/').collect();

    if let [.., parent, last] = segments.as_mut_slice()
        && matches!(*parent, "delete" | "details")
        && !last.is_empty()
    {
        *last = ":id";
    }

    segments.join("/")
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Appends [`ActivityEntry`] lines. A disabled logger drops everything.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogger {
    path: Option<PathBuf>,
}

impl ActivityLogger {
    /// Logger writing to the configured path, or disabled.
    ///
    /// Trims the log to `retention_days` first, so the file stays bounded
    /// without a rewrite on every request.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let path = config.resolved_path();
        if let Some(path) = &path
            && config.retention_days > 0
        {
            let _ = prune_older_than(path, config.retention_days);
        }
        Self { path }
    }

    /// Logger writing to an explicit file.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record one request. Best-effort: I/O failures are ignored so logging
    /// can never fail an API call.
    pub fn record(&self, method: &str, path: &str, status: Option<u16>, latency_ms: u64) {
        let Some(log_path) = &self.path else {
            return;
        };

        let entry = ActivityEntry {
            timestamp: Utc::now().to_rfc3339(),
            method: method.to_string(),
            endpoint: normalize_endpoint(path),
            status,
            latency_ms,
            success: status.is_some_and(|s| (200..300).contains(&s)),
        };

        let _ = append_entry(log_path, &entry);
    }
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from a log file.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<ActivityEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
        .collect()
}

/// Read entries filtered to the last N days. `None` returns everything.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<ActivityEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Drop entries older than `days` (and unreadable lines). Returns how many
/// lines were removed; the file is only rewritten when that is non-zero.
pub fn prune_older_than(path: &Path, days: u32) -> Result<usize> {
    let Ok(content) = fs::read_to_string(path) else {
        return Ok(0);
    };
    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();

    let total = content.lines().count();
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| {
            serde_json::from_str::<ActivityEntry>(line).is_ok_and(|e| e.timestamp >= cutoff)
        })
        .collect();

    let removed = total - kept.len();
    if removed > 0 {
        let mut out = kept.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        let tmp = path.with_extension("jsonl.tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, path)?;
    }
    Ok(removed)
}

fn append_entry(path: &Path, entry: &ActivityEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
