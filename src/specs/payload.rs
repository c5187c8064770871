// src/specs/payload.rs
//! Captured network payloads.
//!
//! Any JSON array inside a relevant response is a candidate. Arrays are scored
//! by how many of their first `payload_sample` elements look like a trader
//! (an address-shaped value and a plausibly large number); the best-scoring
//! array above the thresholds wins and its elements become keyed rows.

use serde_json::Value;

use crate::config::consts::PAYLOAD_MAX_DEPTH;
use crate::config::options::PipelineOptions;
use crate::core::numbers::parse_amount;
use crate::core::patterns::{self, ADDRESS_KEY, TOTAL_KEY};
use crate::record::{RawRow, Strategy};
use crate::snapshot::{CapturedResponse, PageSnapshot};

use super::Extractor;

pub struct PayloadExtractor {
    sample: usize,
    min_array: usize,
    min_score: usize,
    plausible: f64,
}

impl PayloadExtractor {
    pub fn new(opts: &PipelineOptions) -> Self {
        Self {
            sample: opts.payload_sample,
            min_array: opts.payload_min_array,
            min_score: opts.payload_min_score,
            plausible: opts.plausible_volume,
        }
    }

    /// Trader-like elements among the first `sample` of `items`.
    pub fn score(&self, items: &[Value]) -> usize {
        items.iter().take(self.sample).filter(|el| self.looks_like_trader(el)).count()
    }

    fn looks_like_trader(&self, el: &Value) -> bool {
        let leaves: Vec<(Option<&str>, &Value)> = match el {
            Value::Object(_) => {
                let mut out = Vec::new();
                collect_leaves(el, &mut out, 0);
                out
            }
            Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
            _ => return false,
        };

        let has_address = leaves.iter().any(|(k, v)| match v {
            Value::String(s) => {
                let t = s.trim();
                patterns::is_address(t) || (k.is_some_and(|k| ADDRESS_KEY.is_match(k)) && !t.is_empty())
            }
            _ => false,
        });
        let has_amount = leaves.iter().any(|(_, v)| match v {
            Value::Number(n) => n.as_f64().is_some_and(|f| f > self.plausible),
            Value::String(s) => !patterns::is_address(s.trim()) && parse_amount(s).is_some_and(|f| f > self.plausible),
            _ => false,
        });
        has_address && has_amount
    }

    /// Best candidate array across all relevant responses; first found wins ties.
    fn best_array<'a>(&self, responses: &'a [CapturedResponse]) -> Option<&'a [Value]> {
        let mut best: Option<(usize, &'a [Value])> = None;
        for resp in relevant(responses) {
            let mut arrays = Vec::new();
            collect_arrays(&resp.body, &mut arrays, 0);
            for items in arrays {
                if items.len() < self.min_array {
                    continue;
                }
                let score = self.score(items);
                if score < self.min_score {
                    continue;
                }
                if best.is_none_or(|(b, _)| score > b) {
                    best = Some((score, items));
                }
            }
        }
        best.map(|(_, items)| items)
    }
}

impl Extractor for PayloadExtractor {
    fn strategy(&self) -> Strategy { Strategy::Payload }

    fn extract(&self, page: &PageSnapshot) -> Vec<RawRow> {
        self.best_array(&page.responses)
            .map(|items| items.iter().filter_map(RawRow::from_json).collect())
            .unwrap_or_default()
    }
}

fn relevant(responses: &[CapturedResponse]) -> impl Iterator<Item = &CapturedResponse> {
    responses.iter().filter(|r| r.is_relevant())
}

fn collect_arrays<'a>(v: &'a Value, out: &mut Vec<&'a [Value]>, depth: usize) {
    if depth > PAYLOAD_MAX_DEPTH {
        return;
    }
    match v {
        Value::Array(items) => {
            out.push(items.as_slice());
            for i in items {
                collect_arrays(i, out, depth + 1);
            }
        }
        Value::Object(map) => {
            for child in map.values() {
                collect_arrays(child, out, depth + 1);
            }
        }
        _ => {}
    }
}

fn collect_leaves<'a>(v: &'a Value, out: &mut Vec<(Option<&'a str>, &'a Value)>, depth: usize) {
    let Value::Object(map) = v else { return };
    for (k, child) in map {
        match child {
            Value::Object(_) if depth < 2 => collect_leaves(child, out, depth + 1),
            Value::Object(_) | Value::Array(_) => {}
            _ => out.push((Some(k.as_str()), child)),
        }
    }
}

/// Aggregate traded volume advertised by a relevant payload, if any.
/// Only objects outside arrays are searched, so per-trader fields never count.
pub fn total_volume(responses: &[CapturedResponse]) -> Option<f64> {
    relevant(responses).find_map(|r| find_total(&r.body, 0))
}

fn find_total(v: &Value, depth: usize) -> Option<f64> {
    if depth > PAYLOAD_MAX_DEPTH {
        return None;
    }
    let Value::Object(map) = v else { return None };
    for (k, child) in map {
        if TOTAL_KEY.is_match(k) {
            let n = match child {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => parse_amount(s),
                _ => None,
            };
            if let Some(n) = n.filter(|n| n.is_finite() && *n >= 0.0) {
                return Some(n);
            }
        }
    }
    map.values().find_map(|child| find_total(child, depth + 1))
}
