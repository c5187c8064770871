// src/core/numbers.rs
// Amount parsing/formatting for the on-page number styles:
// "$24,356,207", "24,356,207", "$1.2M", "6,577,330 FAF staked", 500000.

use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?)\d[\d,]*(?:\.\d+)?(?:\s?([KkMmBb])\b)?")
        .unwrap_or_else(|e| panic!("bad built-in number pattern: {e}"))
});

/// First numeric token in `s` as a number. Thousands separators are dropped,
/// a trailing K/M/B scales the value. `None` if there is no digit at all.
pub fn parse_amount(s: &str) -> Option<f64> {
    let caps = NUMBER.captures(s)?;
    let whole = caps.get(0)?.as_str();
    let negative = caps.get(1).is_some_and(|m| !m.as_str().is_empty())
        || s[..caps.get(0)?.start()].trim_end().ends_with("-$")
        || s.trim_start().starts_with("-$");
    let digits: String = whole
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut v: f64 = digits.parse().ok()?;
    if let Some(suffix) = caps.get(2) {
        v *= match suffix.as_str() {
            "K" | "k" => 1e3,
            "M" | "m" => 1e6,
            _ => 1e9,
        };
    }
    if negative { v = -v; }
    v.is_finite().then_some(v)
}

/// Digits (and decimal point) of the first numeric token: "6,577,330 FAF" -> "6577330".
pub fn numeric_portion(s: &str) -> String {
    NUMBER
        .find(s)
        .map(|m| {
            m.as_str()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect()
        })
        .unwrap_or_default()
}

pub fn first_integer(s: &str) -> Option<u64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Group an unsigned integer string with commas: "1200000" -> "1,200,000".
fn group_thousands(int_digits: &str) -> String {
    let mut out = String::with_capacity(int_digits.len() + int_digits.len() / 3);
    let n = int_digits.len();
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 { out.push(','); }
        out.push(ch);
    }
    out
}

/// Plain number rendering without trailing zeros: 6577330.0 -> "6577330", 12.5 -> "12.5".
pub fn format_plain(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// "$1,200,000", "$1,234.50", "-$12".
pub fn format_currency(v: f64) -> String {
    let cents = (v.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc();
    let frac = (cents % 100.0) as u64;
    let mut out = s!();
    if v < 0.0 && cents > 0.0 { out.push('-'); }
    out.push('$');
    out.push_str(&group_thousands(&format!("{}", whole as u64)));
    if frac != 0 {
        out.push_str(&format!(".{frac:02}"));
    }
    out
}

/// Does the string look like a big formatted amount (grouped or >= 1000)?
pub fn is_large_formatted(s: &str) -> bool {
    let t = s.trim();
    if t.is_empty() || !t.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '$') {
        return false;
    }
    let bare = t.trim_start_matches('$');
    let plain = bare.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.');
    plain && (bare.contains(',') || parse_amount(bare).is_some_and(|v| v >= 1000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_styles() {
        assert_eq!(parse_amount("$1,200,000"), Some(1_200_000.0));
        assert_eq!(parse_amount("$24,356,207"), Some(24_356_207.0));
        assert_eq!(parse_amount("$1.2M"), Some(1_200_000.0));
        assert_eq!(parse_amount("350K"), Some(350_000.0));
        assert_eq!(parse_amount("-$12.5"), Some(-12.5));
        assert_eq!(parse_amount("$0"), Some(0.0));
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn numeric_portion_strips_grouping() {
        assert_eq!(numeric_portion("6,577,330 FAF staked"), "6577330");
        assert_eq!(numeric_portion("1,234.5"), "1234.5");
        assert_eq!(numeric_portion("none"), "");
    }

    #[test]
    fn currency_format() {
        assert_eq!(format_currency(500000.0), "$500,000");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-12.0), "-$12");
    }

    #[test]
    fn plain_format() {
        assert_eq!(format_plain(6577330.0), "6577330");
        assert_eq!(format_plain(12.25), "12.25");
    }

    #[test]
    fn large_formatted_cells() {
        assert!(is_large_formatted("6,577,330"));
        assert!(is_large_formatted("24356207"));
        assert!(!is_large_formatted("6"));
        assert!(!is_large_formatted("LVL 6"));
    }
}
