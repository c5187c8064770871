// src/specs/ocr.rs
//! OCR transcription reader.
//!
//! OCR output is the noisiest representation: UI chrome mixed with data, rank
//! badges glued onto addresses, split ellipses, `$` read as `S`, and several
//! fields run together on one line. The pre-pass below cleans that up into one
//! field per line, then the text proximity reader does the rest.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::consts::OCR_CHROME;
use crate::config::options::PipelineOptions;
use crate::core::patterns::{self, CURRENCY, LEVEL_MARKER, STAKED_PREFIX, STAKED_SUFFIX};
use crate::core::sanitize::{normalize_ws, split_rank_marker, tighten_ellipsis};
use crate::record::{RawRow, Strategy};
use crate::snapshot::{PageSnapshot, split_lines};

use super::Extractor;
use super::text::{Window, proximity_rows};

static MISREAD_DOLLAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^A-Za-z0-9])S\s?(\d{1,3}(?:,\d{3})+(?:\.\d+)?)")
        .unwrap_or_else(|e| panic!("bad built-in pattern: {e}"))
});

static RANK_BADGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[<«‹(\[]\s*\d{1,3}\s*[>»›)\]]").unwrap_or_else(|e| panic!("bad built-in pattern: {e}"))
});

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").unwrap_or_else(|e| panic!("bad built-in pattern: {e}")));

const LEVEL_WORDS: &[&str] = &["lvl", "lvl.", "level", "level:", "tier"];

pub struct OcrExtractor {
    window: Window,
    max_lines: usize,
}

impl OcrExtractor {
    pub fn new(opts: &PipelineOptions) -> Self {
        Self { window: Window::new(opts), max_lines: opts.max_text_lines }
    }
}

impl Extractor for OcrExtractor {
    fn strategy(&self) -> Strategy { Strategy::Ocr }

    fn extract(&self, page: &PageSnapshot) -> Vec<RawRow> {
        let Some(text) = page.ocr_text.as_deref() else { return Vec::new() };
        proximity_rows(&clean_ocr(text, self.max_lines), self.window)
    }
}

/// De-noise an OCR transcription into one field per line.
pub fn clean_ocr(text: &str, max_lines: usize) -> Vec<String> {
    let lines: Vec<String> = split_lines(text, max_lines)
        .iter()
        .map(|l| {
            let l = tighten_ellipsis(&normalize_ws(l));
            MISREAD_DOLLAR.replace_all(&l, "${1}$$${2}").into_owned()
        })
        .collect();

    merge_split_levels(lines)
        .into_iter()
        .filter(|l| !is_chrome(l))
        .filter_map(|l| {
            let l = RANK_BADGE.replace_all(&l, " ");
            let (_, rest) = split_rank_marker(l.trim());
            let rest = normalize_ws(rest);
            (!rest.is_empty()).then_some(rest)
        })
        .flat_map(|l| explode(&l))
        .collect()
}

fn is_chrome(line: &str) -> bool {
    let l = line.trim().trim_end_matches(':').to_lowercase();
    OCR_CHROME.contains(&l.as_str())
}

/// `LVL` on one line and `6` on the next become `LVL 6`.
fn merge_split_levels(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut it = lines.into_iter().peekable();
    while let Some(line) = it.next() {
        let is_word = LEVEL_WORDS.contains(&line.to_lowercase().as_str());
        let next_is_small_int = it
            .peek()
            .is_some_and(|n| (1..=3).contains(&n.len()) && n.chars().all(|c| c.is_ascii_digit()));
        if is_word && next_is_small_int {
            if let Some(n) = it.next() {
                out.push(format!("{line} {n}"));
                continue;
            }
        }
        out.push(line);
    }
    out
}

/// Split a line holding several fields into one line per field, in on-line order.
/// Lines with no recognisable field pass through unchanged.
fn explode(line: &str) -> Vec<String> {
    let mut spans: Vec<(usize, usize, String)> = Vec::new();

    for m in TOKEN.find_iter(line) {
        let tok = m.as_str().trim_matches(|c: char| matches!(c, '"' | '\'' | '(' | ')' | '[' | ']' | ',' | ':' | ';'));
        if patterns::is_address(tok) {
            spans.push((m.start(), m.end(), tok.to_string()));
        }
    }
    for re in [&*LEVEL_MARKER, &*STAKED_SUFFIX, &*STAKED_PREFIX, &*CURRENCY] {
        spans.extend(re.find_iter(line).map(|m| (m.start(), m.end(), m.as_str().to_string())));
    }
    if spans.is_empty() {
        return vec![line.to_string()];
    }

    // leftmost first, longest on ties; overlapping spans lose
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    let mut out = Vec::with_capacity(spans.len());
    let mut end = 0;
    for (s, e, text) in spans {
        if s < end {
            continue;
        }
        end = e;
        out.push(text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_all;

    const NOISY: &str = "\
LEADERBOARD
Top 20
Connect Wallet
< 01 > 3Bwp ... QA2m LVL 6 6,577,330 FAF S24,356,207
<02> 9xQe…7Hk2
LVL
4
120,000 FAF
$1,200,000
";

    #[test]
    fn cleans_into_one_field_per_line() {
        let lines = clean_ocr(NOISY, 5000);
        assert_eq!(
            lines,
            vec![
                "3Bwp...QA2m", "LVL 6", "6,577,330 FAF", "$24,356,207",
                "9xQe…7Hk2", "LVL 4", "120,000 FAF", "$1,200,000",
            ]
        );
    }

    #[test]
    fn extracts_rows_from_noisy_transcription() {
        let page = PageSnapshot { ocr_text: Some(s!(NOISY)), ..Default::default() };
        let rows = OcrExtractor::new(&PipelineOptions::default()).extract(&page);
        let recs = normalize_all(&rows);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].address, "3Bwp...QA2m");
        assert_eq!(recs[0].level, "LVL 6");
        assert_eq!(recs[0].staked, "6577330");
        assert_eq!(recs[0].volume_numeric, 24_356_207.0);
        assert_eq!(recs[1].level, "LVL 4");
    }

    #[test]
    fn no_ocr_text_no_rows() {
        let ex = OcrExtractor::new(&PipelineOptions::default());
        assert!(ex.extract(&PageSnapshot::default()).is_empty());
    }

    #[test]
    fn plain_words_are_not_dollars() {
        let lines = clean_ocr("Stats 1,000", 10);
        assert_eq!(lines, vec!["Stats 1,000"]);
        let lines = clean_ocr("S 1,000,000", 10);
        assert_eq!(lines, vec!["$1,000,000"]);
    }
}
