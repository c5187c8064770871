// src/specs/mod.rs
//! # Extraction strategies
//!
//! Each strategy knows how to read **one representation** of the leaderboard
//! page and turn it into raw candidate rows, in on-page order. Nothing here
//! ranks, dedups or decides sufficiency; that is the pipeline's job.
//!
//! ## Priority order (highest fidelity first)
//! 1. [`payload`] – captured JSON responses (URL-filtered, best trader-like array).
//! 2. [`table`] – `<tbody><tr><td>` cell texts.
//! 3. [`grid`] – accessibility `role="row"` / `role="cell"` cell texts.
//! 4. [`text`] – flattened visible text, address lines plus nearby amounts.
//! 5. [`ocr`] – OCR transcription of a page raster, de-noised then read like text.
//!
//! ## Conventions
//! - Extractors are **pure**: `&PageSnapshot` in, fresh `Vec<RawRow>` out.
//!   No shared state between attempts, so the pipeline may run them on threads.
//! - A representation that is absent or below its own structural threshold
//!   yields an empty vector; that is a fall-through, not an error.
//! - Thresholds come from `PipelineOptions`, never from literals.
//! - Rows are **not** interpreted here beyond splitting; field resolution lives
//!   in `normalize`.
//!
//! ## Testing notes
//! Every strategy is testable offline against hand-written snapshots; see the
//! `tests` modules and `tests/fixtures/`.

pub mod grid;
pub mod ocr;
pub mod payload;
pub mod table;
pub mod text;

use crate::config::options::PipelineOptions;
use crate::record::{RawRow, Strategy};
use crate::snapshot::PageSnapshot;

pub use grid::GridExtractor;
pub use ocr::OcrExtractor;
pub use payload::PayloadExtractor;
pub use table::TableExtractor;
pub use text::TextExtractor;

/// One way of pulling candidate rows out of a page snapshot.
pub trait Extractor: Send + Sync {
    fn strategy(&self) -> Strategy;
    fn extract(&self, page: &PageSnapshot) -> Vec<RawRow>;
}

/// All strategies in fixed priority order.
pub fn default_chain(opts: &PipelineOptions) -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(PayloadExtractor::new(opts)),
        Box::new(TableExtractor::new(opts)),
        Box::new(GridExtractor::new(opts)),
        Box::new(TextExtractor::new(opts)),
        Box::new(OcrExtractor::new(opts)),
    ]
}
