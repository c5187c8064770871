// tests/properties.rs
//
// Result invariants over generated inputs.
//
use proptest::prelude::*;
use serde_json::json;

use lb_scrape::diff::diff;
use lb_scrape::normalize::normalize;
use lb_scrape::rank::rank;
use lb_scrape::record::check_ranked;
use lb_scrape::{LeaderboardRecord, RawRow};

fn record() -> impl Strategy<Value = LeaderboardRecord> {
    // small address pool so duplicates actually happen
    ("[A-H]{1}", 0u32..40, 0.0f64..1e9).prop_map(|(addr, rank, vol)| LeaderboardRecord {
        rank,
        address: format!("{addr}Bwp...QA2m"),
        level: String::new(),
        staked: String::new(),
        volume_raw: format!("${vol}"),
        volume_numeric: vol,
    })
}

proptest! {
    #[test]
    fn ranked_output_holds_invariants(input in prop::collection::vec(record(), 0..60)) {
        let out = rank(input.clone());
        prop_assert!(out.len() <= 20);
        prop_assert!(check_ranked(&out).is_ok());

        // dense ranks
        let ranks: Vec<u32> = out.iter().map(|r| r.rank).collect();
        let expected: Vec<u32> = (1..=out.len() as u32).collect();
        prop_assert_eq!(ranks, expected);

        // non-increasing volume
        prop_assert!(out.windows(2).all(|w| w[0].volume_numeric >= w[1].volume_numeric));

        // unique addresses
        let mut seen = std::collections::HashSet::new();
        prop_assert!(out.iter().all(|r| seen.insert(r.address.clone())));
    }

    #[test]
    fn ranking_is_idempotent(input in prop::collection::vec(record(), 0..60)) {
        let once = rank(input);
        let twice = rank(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn empty_address_never_survives(vol in 0u64..10_000_000, level in 0u32..20) {
        let row = RawRow::from_json(&json!({"address": "", "volume": vol, "level": level})).unwrap();
        prop_assert!(normalize(&row, 0).is_none());

        let row = RawRow::cells(["", "LVL 3", "$1,000"]);
        prop_assert!(normalize(&row, 0).is_none());
    }

    #[test]
    fn diff_against_nothing_and_self(input in prop::collection::vec(record(), 0..30)) {
        let today = rank(input);
        prop_assert!(diff(&today, &[]).iter().all(|d| d.delta_volume.is_none() && d.delta_rank.is_none()));
        prop_assert!(diff(&today, &today).iter().all(|d| d.delta_volume == Some(0.0) && d.delta_rank == Some(0)));
    }
}
