// src/rank.rs
// Dedup by address (first occurrence wins), stable sort by volume descending,
// truncate, then reassign dense ranks 1..=N.

use std::collections::HashSet;

use crate::config::consts::TOP_N;
use crate::record::LeaderboardRecord;

pub fn rank(records: Vec<LeaderboardRecord>) -> Vec<LeaderboardRecord> {
    rank_top(records, TOP_N)
}

pub fn rank_top(records: Vec<LeaderboardRecord>, top_n: usize) -> Vec<LeaderboardRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut out: Vec<LeaderboardRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.address.clone()))
        .collect();

    // sort_by is stable: equal volumes keep first-seen order
    out.sort_by(|a, b| b.volume_numeric.total_cmp(&a.volume_numeric));
    out.truncate(top_n.min(TOP_N));

    for (i, r) in out.iter_mut().enumerate() {
        r.rank = i as u32 + 1;
    }
    debug_assert!(crate::record::check_ranked(&out).is_ok());
    out
}

/// Quality gate: enough records to stop falling through to lower strategies.
pub fn is_sufficient(ranked: &[LeaderboardRecord], threshold: usize) -> bool {
    !ranked.is_empty() && ranked.len() >= threshold
}
