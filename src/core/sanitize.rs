// src/core/sanitize.rs

/// Decode the handful of entities leaderboard markup actually uses.
pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&hellip;", "…")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Glue the halves of a UI-truncated address back together:
/// `3Bwp … QA2m` / `3Bwp. . .QA2m` -> `3Bwp…QA2m` / `3Bwp...QA2m`.
pub fn tighten_ellipsis(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '…' || ch == '.' {
            let mut j = i;
            let mut dots = String::new();
            while j < chars.len() && matches!(chars[j], '.' | '…' | ' ') {
                if chars[j] != ' ' { dots.push(chars[j]); }
                j += 1;
            }
            if dots == "." {
                // decimal point or punctuation
                out.push('.');
                i += 1;
                continue;
            }
            while out.ends_with(' ') { out.pop(); }
            out.push_str(&dots);
            i = j;
            continue;
        }
        out.push(ch);
        i += 1;
    }
    out
}

/// Remove a leading rank marker such as `< 01 >`, `#1` or `01.`
/// and return `(marker_number, rest)`.
pub fn split_rank_marker(s: &str) -> (Option<u32>, &str) {
    let t = s.trim_start();
    let (open, body) = match t.as_bytes().first() {
        Some(b'<') => (true, &t[1..]),
        Some(b'#') => (false, &t[1..]),
        _ => (false, t),
    };
    let body_trim = body.trim_start();
    let digits: String = body_trim.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 3 {
        return (None, s);
    }
    let mut rest = body_trim[digits.len()..].trim_start();
    if open {
        match rest.strip_prefix('>') {
            Some(r) => rest = r,
            None => return (None, s),
        }
    } else if let Some(r) = rest.strip_prefix('.') {
        // "01. addr" is a marker, "6.5 FAF" is an amount
        if !r.is_empty() && !r.starts_with(char::is_whitespace) {
            return (None, s);
        }
        rest = r;
    } else if !rest.is_empty() && !t.starts_with('#') {
        // "12 LVL" is not a rank marker, "12" alone is
        return (None, s);
    }
    (digits.parse().ok(), rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_decode_amp_last() {
        assert_eq!(normalize_entities("a&amp;lt;b&nbsp;c"), "a&lt;b c");
    }

    #[test]
    fn ellipsis_is_tightened() {
        assert_eq!(tighten_ellipsis("3Bwp ... QA2m"), "3Bwp...QA2m");
        assert_eq!(tighten_ellipsis("3Bwp … QA2m"), "3Bwp…QA2m");
        assert_eq!(tighten_ellipsis("3Bwp. . .QA2m"), "3Bwp...QA2m");
        assert_eq!(tighten_ellipsis("$1,234.56"), "$1,234.56");
    }

    #[test]
    fn rank_markers() {
        assert_eq!(split_rank_marker("< 01 > 3Bwp...QA2m"), (Some(1), "3Bwp...QA2m"));
        assert_eq!(split_rank_marker("<20>"), (Some(20), ""));
        assert_eq!(split_rank_marker("#7 abc"), (Some(7), "abc"));
        assert_eq!(split_rank_marker("12"), (Some(12), ""));
        assert_eq!(split_rank_marker("12 LVL"), (None, "12 LVL"));
        assert_eq!(split_rank_marker("LVL 6"), (None, "LVL 6"));
        assert_eq!(split_rank_marker("03. abc"), (Some(3), "abc"));
        assert_eq!(split_rank_marker("6.5 FAF"), (None, "6.5 FAF"));
    }
}
