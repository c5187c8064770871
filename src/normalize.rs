// src/normalize.rs
//! Raw candidate row -> [`LeaderboardRecord`].
//!
//! Keyed rows (payload objects) are resolved through [`FieldRule`]s: exact key
//! names first, in preference order, then a substring matcher over the
//! remaining keys. Positional rows (DOM cells, text neighbourhoods) are
//! resolved by shape: address-shaped token, `LVL n` marker, `n FAF staked`
//! marker, `$` amount, with a positional fallback for bare-number tables laid
//! out as `[rank, address, level, staked, volume]`.
//!
//! A row without an address, or without any volume reading, is rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::core::numbers::{first_integer, format_currency, format_plain, is_large_formatted, numeric_portion, parse_amount};
use crate::core::patterns::{self, find_address_token};
use crate::core::sanitize::{normalize_entities, normalize_ws, tighten_ellipsis};
use crate::record::{LeaderboardRecord, RawRow, scalar_text};

/// Where a field lives in a keyed row.
pub struct FieldRule {
    /// Exact key names (case-insensitive), most preferred first.
    pub exact: &'static [&'static str],
    /// Substring matcher tried only when no exact key is present.
    pub fuzzy: &'static LazyLock<Regex>,
}

pub static ADDRESS_RULE: FieldRule = FieldRule {
    exact: &["address", "wallet", "walletAddress", "owner", "account", "addr", "trader"],
    fuzzy: &patterns::ADDRESS_KEY,
};
pub static LEVEL_RULE: FieldRule = FieldRule {
    exact: &["level", "lvl", "tier", "userLevel", "rankLevel"],
    fuzzy: &patterns::LEVEL_KEY,
};
pub static STAKED_RULE: FieldRule = FieldRule {
    exact: &["faf", "staked", "fafStaked", "stakedFaf", "stake", "deposited"],
    fuzzy: &patterns::STAKED_KEY,
};
pub static VOLUME_RULE: FieldRule = FieldRule {
    exact: &[
        "volume", "totalVolume", "tradedVolume", "volumeUsd", "usdVolume", "vp", "points",
        "value", "amount", "pnl",
    ],
    fuzzy: &patterns::VOLUME_KEY,
};

impl FieldRule {
    /// Matching pairs of the best non-empty tier: every exact hit (in rule order),
    /// or else every fuzzy hit (in row order) not claimed by `exclude`.
    pub fn resolve<'r>(&self, pairs: &'r [(String, Value)], exclude: &[&FieldRule]) -> Vec<&'r (String, Value)> {
        let exact: Vec<_> = self
            .exact
            .iter()
            .filter_map(|name| pairs.iter().find(|(k, v)| k.eq_ignore_ascii_case(name) && !is_blank(v)))
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        pairs
            .iter()
            .filter(|(k, v)| {
                self.fuzzy.is_match(k)
                    && !is_blank(v)
                    && !exclude.iter().any(|other| other.claims(k))
            })
            .collect()
    }

    fn claims(&self, key: &str) -> bool {
        self.exact.iter().any(|n| key.eq_ignore_ascii_case(n)) || self.fuzzy.is_match(key)
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Volume as observed plus its parsed value.
#[derive(Debug, Default, PartialEq)]
struct Volume {
    raw: String,
    numeric: f64,
}

impl Volume {
    fn from_number(v: f64) -> Self {
        Volume { raw: format_currency(v), numeric: v.max(0.0) }
    }

    /// `$`-prefixed text is kept verbatim; bare numeric text is formatted;
    /// anything else has no volume reading.
    fn from_text(s: &str) -> Self {
        let t = normalize_ws(s);
        if t.starts_with('$') || t.starts_with("-$") {
            let numeric = parse_amount(&t).unwrap_or(0.0).max(0.0);
            return Volume { raw: t, numeric };
        }
        if looks_numeric(&t) {
            if let Some(v) = parse_amount(&t) {
                return Volume::from_number(v);
            }
        }
        Volume::default()
    }

    fn is_missing(&self) -> bool {
        self.raw.is_empty() && self.numeric == 0.0
    }
}

fn looks_numeric(s: &str) -> bool {
    let body = s.trim_end_matches(['K', 'k', 'M', 'm', 'B', 'b']).trim();
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body.chars().all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | ' '))
}

fn canonical_level(n: u64) -> String {
    format!("LVL {n}")
}

/// Normalize one raw row; `index` is its on-page position (provisional rank `index + 1`).
pub fn normalize(raw: &RawRow, index: usize) -> Option<LeaderboardRecord> {
    let parsed = match raw {
        RawRow::Keyed(pairs) => from_keyed(pairs),
        RawRow::Cells(cells) => from_cells(cells),
    };
    let Some((address, level, staked, volume)) = parsed else {
        trace!(index, "row rejected: no address");
        return None;
    };
    if volume.is_missing() {
        trace!(index, %address, "row rejected: no volume");
        return None;
    }
    Some(LeaderboardRecord {
        rank: index as u32 + 1,
        address,
        level,
        staked,
        volume_raw: volume.raw,
        volume_numeric: volume.numeric,
    })
}

/// Normalize every row, dropping rejects, keeping on-page order.
pub fn normalize_all(rows: &[RawRow]) -> Vec<LeaderboardRecord> {
    rows.iter().enumerate().filter_map(|(i, r)| normalize(r, i)).collect()
}

fn clean(s: &str) -> String {
    tighten_ellipsis(&normalize_ws(&normalize_entities(s)))
}

/* ---------------- keyed rows ---------------- */

fn from_keyed(pairs: &[(String, Value)]) -> Option<(String, String, String, Volume)> {
    let address = keyed_address(pairs)?;

    let level = LEVEL_RULE
        .resolve(pairs, &[&ADDRESS_RULE])
        .first()
        .map(|(_, v)| match v {
            Value::Number(n) => n.as_f64().map(|f| canonical_level(f as u64)).unwrap_or_default(),
            other => {
                let text = normalize_ws(&scalar_text(other));
                first_integer(&text).map(canonical_level).unwrap_or(text)
            }
        })
        .unwrap_or_default();

    let staked = STAKED_RULE
        .resolve(pairs, &[&ADDRESS_RULE])
        .first()
        .map(|(_, v)| match v {
            Value::Number(n) => n.as_f64().map(format_plain).unwrap_or_default(),
            other => numeric_portion(&scalar_text(other)),
        })
        .unwrap_or_default();

    let hits = VOLUME_RULE.resolve(pairs, &[&ADDRESS_RULE, &LEVEL_RULE, &STAKED_RULE]);
    let (named, fallback): (Vec<_>, Vec<_>) = hits.into_iter().partition(|(k, _)| is_volume_named(k));
    let volume = pick_volume(&named)
        .or_else(|| {
            let usable: Vec<_> = fallback.into_iter().filter(|(k, v)| !is_negative_pnl(k, v)).collect();
            pick_volume(&usable)
        })
        .unwrap_or_default();

    Some((address, level, staked, volume))
}

/// Numeric beats formatted text, but only within one tier of keys.
fn pick_volume(hits: &[&(String, Value)]) -> Option<Volume> {
    hits.iter()
        .find_map(|(_, v)| v.as_f64().map(Volume::from_number))
        .or_else(|| {
            hits.iter().find_map(|(_, v)| match v {
                Value::String(s) => Some(Volume::from_text(s)),
                _ => None,
            })
        })
}

fn is_volume_named(key: &str) -> bool {
    key.to_ascii_lowercase().contains("volume") || key.eq_ignore_ascii_case("vp")
}

fn is_negative_pnl(key: &str, v: &Value) -> bool {
    if !key.to_ascii_lowercase().contains("pnl") {
        return false;
    }
    match v {
        Value::Number(n) => n.as_f64().is_some_and(|f| f < 0.0),
        Value::String(s) => s.trim_start().starts_with('-'),
        _ => false,
    }
}

fn keyed_address(pairs: &[(String, Value)]) -> Option<String> {
    // an exact key is trusted as-is
    for name in ADDRESS_RULE.exact {
        if let Some((_, Value::String(s))) = pairs.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            let a = clean(s);
            if !a.is_empty() {
                return Some(a);
            }
        }
    }
    // fuzzy keys and bare values must look like an address
    let fuzzy = pairs
        .iter()
        .filter(|(k, _)| ADDRESS_RULE.fuzzy.is_match(k))
        .chain(pairs.iter());
    for (_, v) in fuzzy {
        if let Value::String(s) = v {
            let a = clean(s);
            if patterns::is_address(&a) {
                return Some(a);
            }
        }
    }
    None
}

/* ---------------- positional rows ---------------- */

fn from_cells(raw_cells: &[String]) -> Option<(String, String, String, Volume)> {
    let cells: Vec<String> = raw_cells.iter().map(|c| clean(c)).collect();

    let (addr_idx, address) = cells
        .iter()
        .enumerate()
        .find_map(|(i, c)| find_address_token(c).map(|a| (i, a.to_string())))?;

    let mut used = vec![addr_idx];

    // level: explicit marker, else a bare small integer right after the address
    let mut level = s!();
    if let Some((i, n)) = cells.iter().enumerate().find_map(|(i, c)| {
        if i == addr_idx { return None; }
        let caps = patterns::LEVEL_MARKER.captures(c)?;
        Some((i, caps.get(1)?.as_str().parse::<u64>().ok()?))
    }) {
        level = canonical_level(n);
        used.push(i);
    } else if let Some(c) = cells.get(addr_idx + 1) {
        if c.len() <= 3 && !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()) {
            level = canonical_level(first_integer(c).unwrap_or(0));
            used.push(addr_idx + 1);
        }
    }

    // staked: explicit marker
    let mut staked = s!();
    let mut staked_idx = None;
    for (i, c) in cells.iter().enumerate() {
        if used.contains(&i) || !patterns::STAKED_WORD.is_match(c) { continue; }
        let caps = patterns::STAKED_SUFFIX
            .captures(c)
            .or_else(|| patterns::STAKED_PREFIX.captures(c));
        if let Some(m) = caps.and_then(|caps| caps.get(1)) {
            staked = numeric_portion(m.as_str());
            staked_idx = Some(i);
            break;
        }
    }
    if let Some(i) = staked_idx { used.push(i); }

    // volume: a `$` amount in any unclaimed cell
    let currency = cells.iter().enumerate().find_map(|(i, c)| {
        if used.contains(&i) { return None; }
        patterns::CURRENCY.find(c).map(|m| (i, m.as_str().to_string()))
    });

    let volume = match currency {
        Some((vol_idx, text)) => {
            if staked_idx.is_none() {
                // bare number between address and volume, e.g. [01, addr, 6, 6,577,330, $24,356,207]
                if let Some(i) = (addr_idx + 1..vol_idx).find(|i| !used.contains(i) && is_bare_number(&cells[*i])) {
                    staked = numeric_portion(&cells[i]);
                }
            }
            Volume::from_text(&text)
        }
        None => {
            // last resort: exactly one large formatted number left
            let big: Vec<&String> = cells
                .iter()
                .enumerate()
                .filter(|(i, c)| !used.contains(i) && is_large_formatted(c))
                .map(|(_, c)| c)
                .collect();
            match big.as_slice() {
                [only] => Volume::from_text(only),
                _ => Volume::default(),
            }
        }
    };

    Some((address, level, staked, volume))
}

fn is_bare_number(s: &str) -> bool {
    !s.is_empty() && s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyed(v: Value) -> RawRow {
        RawRow::from_json(&v).unwrap()
    }

    #[test]
    fn wallet_key_with_formatted_volume() {
        let r = normalize(&keyed(json!({"wallet": "abc123...XYZ9", "volume": "$1,200,000"})), 0).unwrap();
        assert_eq!(r.address, "abc123...XYZ9");
        assert_eq!(r.volume_raw, "$1,200,000");
        assert_eq!(r.volume_numeric, 1_200_000.0);
        assert_eq!(r.rank, 1);
    }

    #[test]
    fn numeric_volume_is_formatted_as_currency() {
        let r = normalize(&keyed(json!({"owner": "def456...UVW8", "totalVolume": 500000})), 1).unwrap();
        assert_eq!(r.volume_raw, "$500,000");
        assert_eq!(r.volume_numeric, 500_000.0);
        assert_eq!(r.rank, 2);
    }

    #[test]
    fn exact_key_beats_substring_key() {
        let row = keyed(json!({"address": "abc...xyz", "totalVolumeUsd": 9, "volume": 5000}));
        assert_eq!(normalize(&row, 0).unwrap().volume_numeric, 5000.0);
    }

    #[test]
    fn numeric_field_preferred_over_string_field() {
        let row = keyed(json!({"address": "abc...xyz", "volume": "$1.2M", "totalVolume": 1150000.5}));
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.volume_numeric, 1150000.5);
        assert_eq!(r.volume_raw, "$1,150,000.50");
    }

    #[test]
    fn volume_string_beats_numeric_pnl_or_points() {
        let row = keyed(json!({"address": "3Bwp...QA2m", "volume": "$5,000,000", "pnl": -1200}));
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.volume_raw, "$5,000,000");
        assert_eq!(r.volume_numeric, 5_000_000.0);

        let row = keyed(json!({"address": "3Bwp...QA2m", "volume": "$24,356,207", "points": 42}));
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.volume_raw, "$24,356,207");
        assert_eq!(r.volume_numeric, 24_356_207.0);
    }

    #[test]
    fn points_stand_in_only_without_a_volume_key() {
        let r = normalize(&keyed(json!({"address": "abc...xyz", "points": 42, "pnl": 7})), 0).unwrap();
        assert_eq!(r.volume_raw, "$42");
    }

    #[test]
    fn negative_pnl_is_never_volume() {
        assert_eq!(normalize(&keyed(json!({"address": "abc...xyz", "pnl": -1200})), 0), None);
        let r = normalize(&keyed(json!({"address": "abc...xyz", "pnl": -1200, "amount": "$900"})), 0).unwrap();
        assert_eq!(r.volume_raw, "$900");
    }

    #[test]
    fn level_and_staked_from_keys() {
        let row = keyed(json!({"trader": "abc...xyz", "userLevel": "Tier 4", "stakedFaf": 6577330, "pnl": 10}));
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.level, "LVL 4");
        assert_eq!(r.staked, "6577330");
    }

    #[test]
    fn staked_amount_key_is_not_volume() {
        let row = keyed(json!({"address": "abc...xyz", "stakedAmount": 100, "pointsTotal": "2,500"}));
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.staked, "100");
        assert_eq!(r.volume_numeric, 2500.0);
    }

    #[test]
    fn address_found_by_shape_when_no_key_matches() {
        let row = keyed(json!({"id": 7, "who": "3BwpQA2mZk9xYy7H5rT1uV8wE4sDfGhJkLm", "volume": 2000}));
        assert_eq!(normalize(&row, 0).unwrap().address, "3BwpQA2mZk9xYy7H5rT1uV8wE4sDfGhJkLm");
    }

    #[test]
    fn rejects_empty_address_and_missing_volume() {
        assert_eq!(normalize(&keyed(json!({"address": "", "volume": "$100"})), 0), None);
        assert_eq!(normalize(&keyed(json!({"address": "xyz...789", "volume": ""})), 0), None);
        assert_eq!(normalize(&keyed(json!({"address": "xyz...789", "volume": "n/a"})), 0), None);
    }

    #[test]
    fn formatted_zero_is_accepted() {
        let r = normalize(&keyed(json!({"address": "xyz...789", "volume": "$0"})), 0).unwrap();
        assert_eq!(r.volume_numeric, 0.0);
        assert_eq!(r.volume_raw, "$0");
    }

    #[test]
    fn cells_with_markers() {
        let row = RawRow::cells(["3Bwp...QA2m", "LVL 6", "6,577,330 FAF staked", "$24,356,207"]);
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.address, "3Bwp...QA2m");
        assert_eq!(r.level, "LVL 6");
        assert_eq!(r.staked, "6577330");
        assert_eq!(r.volume_numeric, 24_356_207.0);
    }

    #[test]
    fn positional_table_row() {
        let row = RawRow::cells(["01", "3Bwp … QA2m", "6", "6,577,330", "$24,356,207"]);
        let r = normalize(&row, 4).unwrap();
        assert_eq!(r.address, "3Bwp…QA2m");
        assert_eq!(r.level, "LVL 6");
        assert_eq!(r.staked, "6577330");
        assert_eq!(r.volume_raw, "$24,356,207");
        assert_eq!(r.rank, 5);
    }

    #[test]
    fn single_large_number_is_last_resort_volume() {
        let row = RawRow::cells(["3Bwp...QA2m", "LVL 6", "24,356,207"]);
        let r = normalize(&row, 0).unwrap();
        assert_eq!(r.volume_raw, "$24,356,207");

        let ambiguous = RawRow::cells(["3Bwp...QA2m", "1,000,000", "24,356,207"]);
        assert_eq!(normalize(&ambiguous, 0), None);
    }

    #[test]
    fn cells_without_address_are_rejected() {
        assert_eq!(normalize(&RawRow::cells(["Rank", "Address", "Level", "Volume"]), 0), None);
    }

    #[test]
    fn entity_encoded_ellipsis_in_cells() {
        let r = normalize(&RawRow::cells(["3Bwp&hellip;QA2m", "$5,000"]), 0).unwrap();
        assert_eq!(r.address, "3Bwp…QA2m");
    }
}
