// src/pipeline.rs
//! Orchestration: try strategies in priority order, keep the first whose ranked
//! output is sufficient, else the best partial one, else fail with diagnostics.
//!
//! Selection is a pure function of the ordered attempt outcomes, so sequential
//! and parallel evaluation pick the same result for the same page.

use std::thread;

use tracing::{debug, info, warn};

use crate::config::options::PipelineOptions;
use crate::core::patterns::truncated_parts;
use crate::error::{AttemptSummary, Diagnostics, NoDataCaptured};
use crate::normalize::normalize_all;
use crate::progress::Progress;
use crate::rank::{is_sufficient, rank_top};
use crate::record::{LeaderboardRecord, Strategy, Top20Result};
use crate::snapshot::PageSnapshot;
use crate::specs::{self, Extractor};

/// One strategy's outcome: raw rows seen and the ranked records they produced.
#[derive(Clone, Debug)]
pub struct Attempt {
    pub strategy: Strategy,
    pub raw_rows: usize,
    pub records: Vec<LeaderboardRecord>,
}

impl Attempt {
    pub fn summary(&self) -> AttemptSummary {
        AttemptSummary { strategy: self.strategy, raw_rows: self.raw_rows, accepted: self.records.len() }
    }
}

/// Extract, normalize and rank with a single strategy.
pub fn run_attempt(extractor: &dyn Extractor, page: &PageSnapshot, top_n: usize) -> Attempt {
    let rows = extractor.extract(page);
    let records = rank_top(normalize_all(&rows), top_n);
    Attempt { strategy: extractor.strategy(), raw_rows: rows.len(), records }
}

#[derive(Debug)]
pub struct Selection {
    pub chosen: Option<Attempt>,
    pub tried: Vec<AttemptSummary>,
}

/// Walk attempts in priority order. The first sufficient one wins outright and
/// later attempts are never pulled from the iterator. Otherwise the attempt with
/// the most records wins, the earliest on ties. Empty attempts never win.
pub fn select<I>(attempts: I, threshold: usize, mut observe: impl FnMut(&Attempt)) -> Selection
where
    I: IntoIterator<Item = Attempt>,
{
    let mut best: Option<Attempt> = None;
    let mut tried = Vec::new();
    for attempt in attempts {
        observe(&attempt);
        tried.push(attempt.summary());
        if is_sufficient(&attempt.records, threshold) {
            return Selection { chosen: Some(attempt), tried };
        }
        if attempt.records.len() > best.as_ref().map_or(0, |b| b.records.len()) {
            best = Some(attempt);
        }
    }
    Selection { chosen: best, tried }
}

pub struct Pipeline {
    extractors: Vec<Box<dyn Extractor>>,
    opts: PipelineOptions,
}

impl Pipeline {
    /// All built-in strategies in priority order.
    pub fn new(opts: PipelineOptions) -> Self {
        Self { extractors: specs::default_chain(&opts), opts }
    }

    /// A custom strategy list; its order is the priority order.
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>, opts: PipelineOptions) -> Self {
        Self { extractors, opts }
    }

    pub fn run(
        &self,
        page: &PageSnapshot,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<Top20Result, NoDataCaptured> {
        let top_n = self.opts.top_n();
        if let Some(p) = progress.as_deref_mut() {
            p.begin(self.extractors.len());
        }

        let observe = |a: &Attempt| {
            debug!(strategy = %a.strategy, raw = a.raw_rows, accepted = a.records.len(), "strategy evaluated");
            if let Some(p) = progress.as_deref_mut() {
                p.attempt_done(a.strategy, a.records.len());
            }
        };
        let selection = if self.opts.parallel {
            select(self.attempt_all_parallel(page, top_n), self.opts.sufficient_rows(), observe)
        } else {
            let lazy = self.extractors.iter().map(|e| run_attempt(e.as_ref(), page, top_n));
            select(lazy, self.opts.sufficient_rows(), observe)
        };

        let outcome = match selection.chosen {
            Some(attempt) => {
                let records = prefer_full_addresses(attempt.records, &page.full_addresses(), top_n);
                let total_volume = total_volume(page, self.opts.max_text_lines);
                info!(strategy = %attempt.strategy, records = records.len(), ?total_volume, "leaderboard captured");
                if let Some(p) = progress.as_deref_mut() {
                    p.log(&format!("{} records via {}", records.len(), attempt.strategy));
                }
                Ok(Top20Result { records, total_volume, source: Some(attempt.strategy) })
            }
            None => {
                warn!(attempts = selection.tried.len(), "no strategy produced a record");
                Err(NoDataCaptured {
                    diagnostics: Diagnostics {
                        attempts: selection.tried,
                        text: page.text.clone(),
                        html: page.html.clone(),
                    },
                })
            }
        };

        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        outcome
    }

    /// Evaluate every strategy on its own thread, results in priority order.
    fn attempt_all_parallel(&self, page: &PageSnapshot, top_n: usize) -> Vec<Attempt> {
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .extractors
                .iter()
                .map(|e| scope.spawn(move || run_attempt(e.as_ref(), page, top_n)))
                .collect();
            handles
                .into_iter()
                .zip(&self.extractors)
                .map(|(h, e)| {
                    h.join().unwrap_or_else(|_| {
                        warn!(strategy = %e.strategy(), "strategy panicked; counted as empty");
                        Attempt { strategy: e.strategy(), raw_rows: 0, records: Vec::new() }
                    })
                })
                .collect()
        })
    }
}

/// Replace truncated addresses with the single untruncated address elsewhere on
/// the page that shares their prefix and suffix, then rank again (two truncations
/// may resolve to the same wallet).
pub fn prefer_full_addresses(records: Vec<LeaderboardRecord>, full: &[String], top_n: usize) -> Vec<LeaderboardRecord> {
    if full.is_empty() {
        return records;
    }
    let resolved: Vec<LeaderboardRecord> = records
        .into_iter()
        .map(|mut r| {
            let replacement = truncated_parts(&r.address).and_then(|(pre, suf)| unique_expansion(full, pre, suf));
            if let Some(addr) = replacement {
                r.address = addr;
            }
            r
        })
        .collect();
    rank_top(resolved, top_n)
}

fn unique_expansion(full: &[String], prefix: &str, suffix: &str) -> Option<String> {
    let mut hits = full
        .iter()
        .filter(|f| f.len() > prefix.len() + suffix.len() && f.starts_with(prefix) && f.ends_with(suffix));
    let first = hits.next()?;
    hits.next().is_none().then(|| first.clone())
}

/// Page-level total volume: a payload field first, then a labelled amount in the text.
pub fn total_volume(page: &PageSnapshot, max_lines: usize) -> Option<f64> {
    specs::payload::total_volume(&page.responses)
        .or_else(|| specs::text::total_volume(&page.text_lines(max_lines)))
}
