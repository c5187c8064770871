// src/record.rs
//! Row and record types shared by every stage of the pipeline.
//!
//! - [`RawRow`]: one candidate row exactly as an extractor saw it.
//! - [`LeaderboardRecord`]: the canonical, normalized row.
//! - [`Top20Result`]: the ranked output (dense ranks 1..=N, N <= 20).
//! - [`DiffRecord`]: a record plus its day-over-day deltas.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvariantViolation;

/// A candidate row before interpretation. No invariants.
#[derive(Clone, Debug, PartialEq)]
pub enum RawRow {
    /// Positional cell texts (DOM rows, text neighbourhoods).
    Cells(Vec<String>),
    /// Loosely typed key/value pairs in source order (payload objects).
    Keyed(Vec<(String, Value)>),
}

impl RawRow {
    pub fn cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawRow::Cells(cells.into_iter().map(Into::into).collect())
    }

    /// Interpret one element of a payload array.
    /// Objects are flattened (nested objects contribute their leaf keys, first one wins),
    /// arrays become positional cells, scalars are not rows.
    pub fn from_json(v: &Value) -> Option<RawRow> {
        match v {
            Value::Object(_) => {
                let mut pairs = Vec::new();
                flatten_into(v, &mut pairs, 0);
                Some(RawRow::Keyed(pairs))
            }
            Value::Array(items) => Some(RawRow::Cells(items.iter().map(scalar_text).collect())),
            _ => None,
        }
    }
}

fn flatten_into(v: &Value, out: &mut Vec<(String, Value)>, depth: usize) {
    let Value::Object(map) = v else { return };
    for (k, child) in map {
        match child {
            Value::Object(_) if depth < 2 => flatten_into(child, out, depth + 1),
            Value::Array(_) | Value::Object(_) => {}
            _ => {
                if !out.iter().any(|(seen, _)| seen == k) {
                    out.push((k.clone(), child.clone()));
                }
            }
        }
    }
}

/// Text of a JSON scalar as it would read on the page.
pub fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => s!(),
    }
}

/// Canonical leaderboard row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRecord {
    pub rank: u32,
    pub address: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub staked: String,
    #[serde(default)]
    pub volume_raw: String,
    #[serde(default)]
    pub volume_numeric: f64,
}

/// Which extraction strategy produced a result, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Payload,
    Table,
    Grid,
    Text,
    Ocr,
}

impl Strategy {
    pub const ALL: [Strategy; 5] =
        [Strategy::Payload, Strategy::Table, Strategy::Grid, Strategy::Text, Strategy::Ocr];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Payload => "payload",
            Strategy::Table => "table",
            Strategy::Grid => "grid",
            Strategy::Text => "text",
            Strategy::Ocr => "ocr",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ranked output of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Top20Result {
    pub records: Vec<LeaderboardRecord>,
    /// Separately sourced aggregate; not the sum of `records`.
    #[serde(default)]
    pub total_volume: Option<f64>,
    /// Strategy whose rows were selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Strategy>,
}

impl Top20Result {
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Dense ranks 1..=N (N <= 20), unique addresses, non-increasing volume.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        check_ranked(&self.records)
    }
}

pub fn check_ranked(records: &[LeaderboardRecord]) -> Result<(), InvariantViolation> {
    if records.len() > crate::config::consts::TOP_N {
        return Err(InvariantViolation::TooMany(records.len()));
    }
    let mut seen = HashSet::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        let expected = i as u32 + 1;
        if r.rank != expected {
            return Err(InvariantViolation::RankGap { position: i, rank: r.rank });
        }
        if !seen.insert(r.address.as_str()) {
            return Err(InvariantViolation::DuplicateAddress(r.address.clone()));
        }
        if i > 0 && records[i - 1].volume_numeric < r.volume_numeric {
            return Err(InvariantViolation::Unsorted { position: i });
        }
    }
    Ok(())
}

/// A record plus its deltas against the previous snapshot.
/// Deltas are `None` for new entrants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRecord {
    #[serde(flatten)]
    pub record: LeaderboardRecord,
    pub delta_volume: Option<f64>,
    pub delta_rank: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(rank: u32, address: &str, vol: f64) -> LeaderboardRecord {
        LeaderboardRecord {
            rank,
            address: address.into(),
            level: s!(),
            staked: s!(),
            volume_raw: format!("${vol}"),
            volume_numeric: vol,
        }
    }

    #[test]
    fn nested_objects_flatten_to_leaf_keys() {
        let v = json!({"user": {"wallet": "abc...xyz", "level": 3}, "volume": 10, "tags": ["a"]});
        let RawRow::Keyed(pairs) = RawRow::from_json(&v).unwrap() else { panic!("expected keyed") };
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["wallet", "level", "volume"]);
    }

    #[test]
    fn array_element_becomes_cells() {
        let v = json!(["abc...xyz", 6, "$1,000"]);
        assert_eq!(RawRow::from_json(&v), Some(RawRow::cells(["abc...xyz", "6", "$1,000"])));
        assert_eq!(RawRow::from_json(&json!(5)), None);
    }

    #[test]
    fn invariants_detect_each_violation() {
        let ok = vec![rec(1, "a", 10.0), rec(2, "b", 5.0)];
        assert!(check_ranked(&ok).is_ok());

        let gap = vec![rec(1, "a", 10.0), rec(3, "b", 5.0)];
        assert!(matches!(check_ranked(&gap), Err(InvariantViolation::RankGap { position: 1, rank: 3 })));

        let dup = vec![rec(1, "a", 10.0), rec(2, "a", 5.0)];
        assert!(matches!(check_ranked(&dup), Err(InvariantViolation::DuplicateAddress(_))));

        let unsorted = vec![rec(1, "a", 1.0), rec(2, "b", 5.0)];
        assert!(matches!(check_ranked(&unsorted), Err(InvariantViolation::Unsorted { position: 1 })));
    }

    #[test]
    fn record_serializes_camel_case() {
        let v = serde_json::to_value(rec(1, "a", 2.0)).unwrap();
        assert_eq!(v["volumeNumeric"], json!(2.0));
        assert_eq!(v["volumeRaw"], json!("$2"));
    }
}
