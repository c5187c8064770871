// src/diff.rs
// Day-over-day deltas keyed by address.
// An address present yesterday but gone today is not reported.

use std::collections::HashMap;

use crate::record::{DiffRecord, LeaderboardRecord};

pub fn diff(today: &[LeaderboardRecord], yesterday: &[LeaderboardRecord]) -> Vec<DiffRecord> {
    let prior: HashMap<&str, &LeaderboardRecord> = yesterday
        .iter()
        .rev() // first occurrence wins on duplicate addresses
        .map(|r| (r.address.as_str(), r))
        .collect();

    today
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let (delta_volume, delta_rank) = match prior.get(r.address.as_str()) {
                Some(y) => (
                    Some(r.volume_numeric - y.volume_numeric),
                    Some((i as i64 + 1) - y.rank as i64),
                ),
                None => (None, None),
            };
            DiffRecord { record: r.clone(), delta_volume, delta_rank }
        })
        .collect()
}

/// Change of the aggregate total, when both days have one.
pub fn total_delta(today: Option<f64>, yesterday: Option<f64>) -> Option<f64> {
    Some(today? - yesterday?)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn moved_down_one_place() {
        let yesterday = vec![rec(1, "A", 1000.0)];
        let today = vec![rec(1, "B", 2000.0), rec(2, "A", 900.0)];
        let d = diff(&today, &yesterday);
        assert_eq!(d[1].delta_volume, Some(-100.0));
        assert_eq!(d[1].delta_rank, Some(1));
        assert_eq!(d[0].delta_volume, None);
        assert_eq!(d[0].delta_rank, None);
    }

    #[test]
    fn empty_baseline_gives_null_deltas() {
        let today = vec![rec(1, "A", 5.0), rec(2, "B", 4.0)];
        assert!(diff(&today, &[]).iter().all(|d| d.delta_volume.is_none() && d.delta_rank.is_none()));
    }

    #[test]
    fn self_diff_is_zero() {
        let today = vec![rec(1, "A", 5.0), rec(2, "B", 4.0)];
        assert!(diff(&today, &today).iter().all(|d| d.delta_volume == Some(0.0) && d.delta_rank == Some(0)));
    }

    #[test]
    fn dropped_addresses_are_not_reported() {
        let d = diff(&[rec(1, "A", 5.0)], &[rec(1, "Z", 9.0), rec(2, "A", 1.0)]);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].delta_rank, Some(-1));
    }

    #[test]
    fn total_delta_needs_both() {
        assert_eq!(total_delta(Some(10.0), Some(4.0)), Some(6.0));
        assert_eq!(total_delta(Some(10.0), None), None);
    }
}
