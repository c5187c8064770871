// src/core/patterns.rs
//! Compiled patterns shared by the normalizer and the extractors.
//!
//! Addresses use a base58-style alphabet (no `0`, `O`, `I`, `l`). The UI shows
//! them either in full or truncated around an ellipsis (`3Bwp…QA2m`, `3Bwp...QA2m`).

use std::sync::LazyLock;

use regex::Regex;

fn re(src: &str) -> Regex {
    Regex::new(src).unwrap_or_else(|e| panic!("bad built-in pattern {src:?}: {e}"))
}

pub static FULL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| re(r"^[1-9A-HJ-NP-Za-km-z]{20,45}$"));

pub static TRUNCATED_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| re(r"^([1-9A-HJ-NP-Za-km-z]+)(?:…|\.{3,})([1-9A-HJ-NP-Za-km-z]+)$"));

// Field-name matchers (keyed rows)
pub static ADDRESS_KEY: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)address|wallet|owner|account|addr|trader"));
pub static LEVEL_KEY: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)level|lvl|tier"));
pub static STAKED_KEY: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)faf|staked|stake|deposited"));
pub static VOLUME_KEY: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)volume|totalvolume|tradedvolume|vp|points|value|amount|pnl"));
pub static TOTAL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^(?:total_?volume|total_?traded_?volume|epoch_?volume|day_?volume|daily_?volume|volume_?total)(?:_?usd)?$")
});

/// Captured responses worth looking at.
pub static RELEVANT_URL: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)leader|board|rank|volume|wallet|address|faf|trader|stats"));

// In-text markers
pub static LEVEL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:lvl|level|tier)\s*[:.]?\s*(\d+)"));
pub static STAKED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:faf\b|staked\b|stake\b)"));
pub static STAKED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:faf|staked|stake|deposited)\s*[:=]?\s*(\d[\d,]*(?:\.\d+)?)"));
pub static STAKED_WORD: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:faf|staked|stake|deposited)\b"));
pub static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| re(r"-?\$\s?\d[\d,]*(?:\.\d+)?(?:\s?[KkMmBb]\b)?"));
pub static CURRENCY_LINE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^-?\$\s?\d[\d,]*(?:\.\d+)?\s?[KkMmBb]?$"));
pub static TOTAL_LABEL: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\btotal\s+(?:volume|vol\b)"));

pub fn is_full_address(s: &str) -> bool {
    FULL_ADDRESS.is_match(s)
}

pub fn is_truncated_address(s: &str) -> bool {
    TRUNCATED_ADDRESS.is_match(s)
}

pub fn is_address(s: &str) -> bool {
    is_full_address(s) || is_truncated_address(s)
}

/// `(prefix, suffix)` of a truncated address.
pub fn truncated_parts(s: &str) -> Option<(&str, &str)> {
    let caps = TRUNCATED_ADDRESS.captures(s)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// First whitespace-separated token of `s` that is address-shaped.
/// Surrounding punctuation (quotes, brackets, commas) is ignored.
pub fn find_address_token(s: &str) -> Option<&str> {
    let t = s.trim();
    if is_address(t) {
        return Some(t);
    }
    t.split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| matches!(c, '"' | '\'' | '(' | ')' | '[' | ']' | ',' | ':' | ';')))
        .find(|tok| is_address(tok))
}
