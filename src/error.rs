// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::record::Strategy;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    NoData(#[from] NoDataCaptured),
}

/// Outcome of one strategy attempt, kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptSummary {
    pub strategy: Strategy,
    pub raw_rows: usize,
    pub accepted: usize,
}

/// What the caller can persist when nothing usable was captured.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    pub attempts: Vec<AttemptSummary>,
    pub text: Option<String>,
    pub html: Option<String>,
}

/// Every strategy was exhausted with zero usable records.
#[derive(Error, Debug)]
#[error("no rows captured ({} strategies tried: {})", .diagnostics.attempts.len(), tried(&.diagnostics.attempts))]
pub struct NoDataCaptured {
    pub diagnostics: Diagnostics,
}

fn tried(attempts: &[AttemptSummary]) -> String {
    if attempts.is_empty() {
        return s!("none");
    }
    attempts
        .iter()
        .map(|a| format!("{}={}/{}", a.strategy, a.accepted, a.raw_rows))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A ranked list that breaks the result invariants. Programming error, never input-driven.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("more than 20 records ({0})")]
    TooMany(usize),
    #[error("rank {rank} at position {position} breaks the dense 1..N sequence")]
    RankGap { position: usize, rank: u32 },
    #[error("duplicate address {0}")]
    DuplicateAddress(String),
    #[error("volume increases at position {position}")]
    Unsorted { position: usize },
}
