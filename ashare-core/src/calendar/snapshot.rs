//! Persisted calendar snapshot.
//!
//! A single JSON file holding the trading-day and holiday lists. The file
//! is overwritten wholesale on every refresh (no per-range invalidation)
//! and written atomically: write to .tmp, rename into place.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk form of the calendar state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSnapshot {
    pub trading_days: Vec<NaiveDate>,
    pub holidays: Vec<NaiveDate>,
}

impl CalendarSnapshot {
    /// Read a snapshot if the file exists and parses; a corrupt or missing
    /// file is treated as no snapshot.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Write the snapshot atomically, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;

        fs::rename(&tmp_path, path).map_err(|e| {
            // Clean up temp file on rename failure
            let _ = fs::remove_file(&tmp_path);
            SnapshotError::Io(e)
        })
    }
}
