// src/report.rs
//! Today's leaderboard with day-over-day deltas, ready for export.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::options::{ExportFormat, ExportOptions};
use crate::core::numbers::format_currency;
use crate::csv::to_export_string;
use crate::diff::{diff, total_delta};
use crate::error::Result;
use crate::record::{DiffRecord, Strategy, Top20Result};
use crate::store::PersistedSnapshot;

pub const HEADERS: [&str; 7] = ["Rank", "Address", "Level", "Staked", "Volume", "Δ Volume", "Δ Rank"];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub captured_at: DateTime<Utc>,
    pub source: Option<Strategy>,
    pub total_volume: Option<f64>,
    pub total_volume_delta: Option<f64>,
    /// When the baseline the deltas are against was captured.
    pub baseline_at: Option<DateTime<Utc>>,
    pub rows: Vec<DiffRecord>,
}

impl Report {
    /// Without a baseline every delta is absent.
    pub fn build(result: &Top20Result, baseline: Option<&PersistedSnapshot>, captured_at: DateTime<Utc>) -> Self {
        let prior = baseline.map(|b| b.records.as_slice()).unwrap_or(&[]);
        Self {
            captured_at,
            source: result.source,
            total_volume: result.total_volume,
            total_volume_delta: total_delta(result.total_volume, baseline.and_then(|b| b.total_volume)),
            baseline_at: baseline.map(|b| b.captured_at),
            rows: diff(&result.records, prior),
        }
    }

    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|d| {
                let r = &d.record;
                vec![
                    r.rank.to_string(),
                    r.address.clone(),
                    r.level.clone(),
                    r.staked.clone(),
                    r.volume_raw.clone(),
                    d.delta_volume.map(signed_currency).unwrap_or_default(),
                    d.delta_rank.map(|n| format!("{n:+}")).unwrap_or_default(),
                ]
            })
            .collect()
    }

    pub fn render(&self, export: &ExportOptions) -> Result<String> {
        match export.format.delim() {
            Some(sep) => Ok(to_export_string(&HEADERS, &self.table_rows(), export.include_headers, sep)),
            None => {
                debug_assert_eq!(export.format, ExportFormat::Json);
                Ok(serde_json::to_string_pretty(self)? + "\n")
            }
        }
    }
}

/// `+$1,200` / `-$300` / `$0`.
fn signed_currency(v: f64) -> String {
    if v > 0.0 { join!("+", &format_currency(v)) } else { format_currency(v) }
}
