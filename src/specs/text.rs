// src/specs/text.rs
//! Visible-text proximity reader.
//!
//! The page text is a flat list of lines. Every address-shaped line anchors a
//! row; its level, staked amount and `$` volume are looked up in a window of
//! nearby lines, forward first (up to `window_after`), then backward (up to
//! `window_before`). Windows never cross a neighbouring address line, and a
//! volume line serves one address only. Anchors without a volume are dropped.

use std::collections::HashSet;

use tracing::trace;

use crate::config::consts::TOTAL_LABEL_REACH;
use crate::config::options::PipelineOptions;
use crate::core::numbers::parse_amount;
use crate::core::patterns::{self, CURRENCY, CURRENCY_LINE, LEVEL_MARKER, STAKED_PREFIX, STAKED_SUFFIX, STAKED_WORD, TOTAL_LABEL};
use crate::core::sanitize::{split_rank_marker, tighten_ellipsis};
use crate::record::{RawRow, Strategy};
use crate::snapshot::PageSnapshot;

use super::Extractor;

pub struct TextExtractor {
    window: Window,
    max_lines: usize,
}

/// How far around an anchor line to look.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    pub before: usize,
    pub after: usize,
}

impl Window {
    pub fn new(opts: &PipelineOptions) -> Self {
        Self { before: opts.window_before, after: opts.window_after }
    }
}

impl TextExtractor {
    pub fn new(opts: &PipelineOptions) -> Self {
        Self { window: Window::new(opts), max_lines: opts.max_text_lines }
    }
}

impl Extractor for TextExtractor {
    fn strategy(&self) -> Strategy { Strategy::Text }

    fn extract(&self, page: &PageSnapshot) -> Vec<RawRow> {
        proximity_rows(&page.text_lines(self.max_lines), self.window)
    }
}

/// The address on `line`, if the line is nothing but an address (an optional
/// leading rank marker aside).
fn anchor_address(line: &str) -> Option<String> {
    let t = tighten_ellipsis(line.trim());
    if patterns::is_address(&t) {
        return Some(t);
    }
    let (_, rest) = split_rank_marker(&t);
    let rest = rest.trim();
    patterns::is_address(rest).then(|| rest.to_string())
}

fn is_volume_line(line: &str) -> bool {
    CURRENCY_LINE.is_match(line.trim())
}

fn is_level_line(line: &str) -> bool {
    LEVEL_MARKER.is_match(line)
}

fn is_staked_line(line: &str) -> bool {
    STAKED_WORD.is_match(line) && (STAKED_SUFFIX.is_match(line) || STAKED_PREFIX.is_match(line))
}

/// Build one positional row per anchored address, in on-page order.
pub(crate) fn proximity_rows(lines: &[String], window: Window) -> Vec<RawRow> {
    let anchors: Vec<(usize, String)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| anchor_address(l).map(|a| (i, a)))
        .collect();

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut rows = Vec::with_capacity(anchors.len());

    for (k, (at, address)) in anchors.iter().enumerate() {
        let prev = k.checked_sub(1).map(|p| anchors[p].0);
        let next = anchors.get(k + 1).map(|(n, _)| *n);

        let fwd_end = (at + window.after).min(lines.len().saturating_sub(1)).min(next.map_or(usize::MAX, |n| n - 1));
        let bwd_start = at.saturating_sub(window.before).max(prev.map_or(0, |p| p + 1));

        // nearest first on both sides
        let forward = (at + 1..=fwd_end).collect::<Vec<_>>();
        let backward = (bwd_start..*at).rev().collect::<Vec<_>>();
        let order: Vec<usize> = forward.into_iter().chain(backward).collect();

        let find = |pred: fn(&str) -> bool, claimed: &HashSet<usize>| {
            order.iter().copied().find(|i| !claimed.contains(i) && pred(&lines[*i]))
        };

        let Some(vol) = find(is_volume_line, &claimed) else {
            trace!(line = at, %address, "text anchor without volume");
            continue;
        };
        claimed.insert(vol);

        let mut cells = vec![address.clone()];
        if let Some(i) = find(is_level_line, &claimed) {
            claimed.insert(i);
            cells.push(lines[i].clone());
        }
        if let Some(i) = find(is_staked_line, &claimed) {
            claimed.insert(i);
            cells.push(lines[i].clone());
        }
        cells.push(lines[vol].clone());
        rows.push(RawRow::Cells(cells));
    }
    rows
}

/// Aggregate volume shown near a "Total Volume" label: on the label line itself
/// or within the next few lines.
pub fn total_volume(lines: &[String]) -> Option<f64> {
    lines.iter().enumerate().filter(|(_, l)| TOTAL_LABEL.is_match(l)).find_map(|(i, label)| {
        std::iter::once(label)
            .chain(lines.iter().skip(i + 1).take(TOTAL_LABEL_REACH))
            .find_map(|l| CURRENCY.find(l))
            .and_then(|m| parse_amount(m.as_str()))
    })
}
