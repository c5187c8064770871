// src/specs/grid.rs
use crate::config::options::PipelineOptions;
use crate::record::{RawRow, Strategy};
use crate::snapshot::PageSnapshot;

use super::Extractor;
use super::table::qualifying_rows;

/// Accessibility grid rows: `[role=row] > [role=cell]`. Same gate as the table reader.
pub struct GridExtractor {
    min_cells: usize,
    min_rows: usize,
}

impl GridExtractor {
    pub fn new(opts: &PipelineOptions) -> Self {
        Self { min_cells: opts.min_cells, min_rows: opts.min_table_rows }
    }
}

impl Extractor for GridExtractor {
    fn strategy(&self) -> Strategy { Strategy::Grid }

    fn extract(&self, page: &PageSnapshot) -> Vec<RawRow> {
        qualifying_rows(&page.grid_rows, self.min_cells, self.min_rows)
    }
}
