// src/specs/table.rs
use crate::config::options::PipelineOptions;
use crate::core::sanitize::normalize_ws;
use crate::record::{RawRow, Strategy};
use crate::snapshot::PageSnapshot;

use super::Extractor;

/// Markup table rows: `tbody > tr > td`.
pub struct TableExtractor {
    min_cells: usize,
    min_rows: usize,
}

impl TableExtractor {
    pub fn new(opts: &PipelineOptions) -> Self {
        Self { min_cells: opts.min_cells, min_rows: opts.min_table_rows }
    }
}

impl Extractor for TableExtractor {
    fn strategy(&self) -> Strategy { Strategy::Table }

    fn extract(&self, page: &PageSnapshot) -> Vec<RawRow> {
        qualifying_rows(&page.table_rows, self.min_cells, self.min_rows)
    }
}

/// Rows with at least `min_cells` cells, whitespace-collapsed.
/// All or nothing: fewer than `min_rows` such rows yields nothing.
pub(crate) fn qualifying_rows(rows: &[Vec<String>], min_cells: usize, min_rows: usize) -> Vec<RawRow> {
    let out: Vec<RawRow> = rows
        .iter()
        .map(|cells| cells.iter().map(|c| normalize_ws(c)).collect::<Vec<_>>())
        .filter(|cells| cells.iter().filter(|c| !c.is_empty()).count() >= min_cells)
        .map(RawRow::Cells)
        .collect();
    if out.len() < min_rows {
        return Vec::new();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize, cells: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| (0..cells).map(|c| format!(" cell  {i}-{c} ")).collect())
            .collect()
    }

    #[test]
    fn needs_ten_rows_of_four_cells() {
        let ex = TableExtractor::new(&PipelineOptions::default());
        let page = PageSnapshot { table_rows: rows(10, 4), ..Default::default() };
        let out = ex.extract(&page);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0], RawRow::cells(["cell 0-0", "cell 0-1", "cell 0-2", "cell 0-3"]));

        let short = PageSnapshot { table_rows: rows(9, 4), ..Default::default() };
        assert!(ex.extract(&short).is_empty());

        let narrow = PageSnapshot { table_rows: rows(12, 3), ..Default::default() };
        assert!(ex.extract(&narrow).is_empty());
    }

    #[test]
    fn narrow_rows_are_skipped_not_fatal() {
        let mut r = rows(10, 5);
        r.insert(3, vec![s!("Loading")]);
        let out = qualifying_rows(&r, 4, 10);
        assert_eq!(out.len(), 10);
    }
}
