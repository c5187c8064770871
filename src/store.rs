// src/store.rs
//! Persisted baseline: yesterday's leaderboard as JSON.
//!
//! Writes go to a sibling temp file which is then renamed over the target, so
//! a crash mid-write never leaves a half-written baseline behind.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::file::ensure_directory;
use crate::record::{LeaderboardRecord, Strategy, Top20Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub captured_at: DateTime<Utc>,
    pub records: Vec<LeaderboardRecord>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub source: Option<Strategy>,
}

impl PersistedSnapshot {
    pub fn from_result(result: &Top20Result, captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            records: result.records.clone(),
            total_volume: result.total_volume,
            source: result.source,
        }
    }
}

/// Previously saved snapshot. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<PersistedSnapshot>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snap: PersistedSnapshot = serde_json::from_str(&text)?;
    debug!(path = %path.display(), records = snap.records.len(), "baseline loaded");
    Ok(Some(snap))
}

/// Like [`load`], but an unreadable baseline is logged and treated as absent.
pub fn load_or_warn(path: &Path) -> Option<PersistedSnapshot> {
    load(path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring unreadable baseline");
        None
    })
}

/// Replace the baseline. An empty snapshot is refused: it would wipe out the
/// previous day's data for no gain.
pub fn save(path: &Path, snap: &PersistedSnapshot) -> Result<()> {
    if snap.records.is_empty() {
        return Err(Error::Input(s!("refusing to save an empty leaderboard snapshot")));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    let json = serde_json::to_string_pretty(snap)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), records = snap.records.len(), "baseline saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snap(n: usize) -> PersistedSnapshot {
        let records = (0..n)
            .map(|i| LeaderboardRecord {
                rank: i as u32 + 1,
                address: format!("{}Bwp...QA2m", i + 1),
                level: s!("LVL 3"),
                staked: s!("1000"),
                volume_raw: s!("$5,000"),
                volume_numeric: 5000.0,
            })
            .collect();
        PersistedSnapshot {
            captured_at: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
            records,
            total_volume: Some(1e6),
            source: Some(Strategy::Table),
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snap.json");
        save(&path, &snap(3)).unwrap();
        assert_eq!(load(&path).unwrap(), Some(snap(3)));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_is_none_and_empty_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        assert_eq!(load(&path).unwrap(), None);
        assert!(matches!(save(&path, &snap(0)), Err(Error::Input(_))));
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_baseline_is_an_error_or_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path), Err(Error::Json(_))));
        assert_eq!(load_or_warn(&path), None);
    }
}
