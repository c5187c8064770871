// src/snapshot.rs
//! The page snapshot bundle handed over by the browser-driving collaborator.
//!
//! Every representation is optional. Captured payloads arrive already parsed;
//! DOM rows are arrays of cell texts. When only serialized markup is at hand,
//! [`PageSnapshot::with_html`] derives table rows, grid rows and the visible
//! text from it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::html::{inner_after_open_tag, next_element_with_ci, next_tag_block_ci, to_lower};
use crate::core::patterns::{RELEVANT_URL, is_full_address};
use crate::core::vischars::{visible_lines, visible_text};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub url: String,
    pub body: Value,
}

impl CapturedResponse {
    /// Whether the URL looks like leaderboard traffic; anything else is ignored.
    pub fn is_relevant(&self) -> bool {
        RELEVANT_URL.is_match(&self.url)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub responses: Vec<CapturedResponse>,
    /// `<tbody><tr><td>` cell texts.
    pub table_rows: Vec<Vec<String>>,
    /// `role="row"` / `role="cell"` cell texts.
    pub grid_rows: Vec<Vec<String>>,
    /// Flattened visible text of the page.
    pub text: Option<String>,
    /// OCR transcription of a full-page raster.
    pub ocr_text: Option<String>,
    /// Serialized markup, kept for debug artifacts.
    pub html: Option<String>,
}

impl PageSnapshot {
    /// Read a JSON bundle from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Attach markup and fill in whatever representation is still missing.
    pub fn with_html(mut self, html: String) -> Self {
        if self.table_rows.is_empty() {
            self.table_rows = markup_table_rows(&html);
        }
        if self.grid_rows.is_empty() {
            self.grid_rows = markup_grid_rows(&html);
        }
        if self.text.as_deref().is_none_or(|t| t.trim().is_empty()) {
            self.text = Some(visible_lines(&html).join("\n"));
        }
        self.html = Some(html);
        self
    }

    /// Non-empty trimmed lines of the visible text, capped at `max`.
    pub fn text_lines(&self, max: usize) -> Vec<String> {
        split_lines(self.text.as_deref().unwrap_or(""), max)
    }

    /// Every untruncated address visible anywhere except OCR, in first-seen order.
    pub fn full_addresses(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |s: &str| {
            for tok in s.split_whitespace() {
                let tok = tok.trim_matches(|c: char| !c.is_ascii_alphanumeric());
                if is_full_address(tok) && !out.iter().any(|a| a == tok) {
                    out.push(tok.to_string());
                }
            }
        };
        for r in self.responses.iter().filter(|r| r.is_relevant()) {
            walk_strings(&r.body, &mut push);
        }
        for cell in self.table_rows.iter().chain(&self.grid_rows).flatten() {
            push(cell.as_str());
        }
        if let Some(t) = &self.text {
            push(t.as_str());
        }
        out
    }
}

pub fn split_lines(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

fn walk_strings(v: &Value, f: &mut impl FnMut(&str)) {
    match v {
        Value::String(s) => f(s),
        Value::Array(items) => items.iter().for_each(|i| walk_strings(i, f)),
        Value::Object(map) => map.values().for_each(|i| walk_strings(i, f)),
        _ => {}
    }
}

/// Cell texts of every `<tr>` inside `<tbody>` (or `<table>` when the page has no tbody).
pub fn markup_table_rows(html: &str) -> Vec<Vec<String>> {
    let lc = to_lower(html);
    let mut rows = Vec::new();
    for container in ["<tbody", "<table"] {
        let close = format!("</{}>", &container[1..]);
        let mut pos = 0usize;
        while let Some((s, e)) = next_tag_block_ci(html, &lc, container, &close, pos) {
            pos = e;
            let (body, body_lc) = (&html[s..e], &lc[s..e]);
            let mut tr_pos = 0usize;
            while let Some((tr_s, tr_e)) = next_tag_block_ci(body, body_lc, "<tr", "</tr>", tr_pos) {
                tr_pos = tr_e;
                let (tr, tr_lc) = (&body[tr_s..tr_e], &body_lc[tr_s..tr_e]);
                let mut cells = Vec::new();
                let mut td_pos = 0usize;
                while let Some((td_s, td_e)) = next_tag_block_ci(tr, tr_lc, "<td", "</td>", td_pos) {
                    cells.push(visible_text(&inner_after_open_tag(&tr[td_s..td_e])));
                    td_pos = td_e;
                }
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
        }
        if !rows.is_empty() {
            break;
        }
    }
    rows
}

const CELL_NEEDLES: &[&str] = &[r#"role="cell""#, r#"role="gridcell""#, "data-column", "cell"];

/// Cell texts of every `role="row"` element. Cells are the first needle kind
/// that matches inside the row: `role="cell"`, `role="gridcell"`, `data-column`,
/// then any opening tag mentioning "cell" (class names).
pub fn markup_grid_rows(html: &str) -> Vec<Vec<String>> {
    let lc = to_lower(html);
    let mut rows = Vec::new();
    let mut pos = 0usize;
    while let Some((s, e)) = next_element_with_ci(html, &lc, r#"role="row""#, pos) {
        pos = e;
        let row = &html[s..e];
        let Some(open_end) = row.find('>').map(|p| p + 1) else { continue };
        let (inner, inner_lc) = (&row[open_end..], &lc[s + open_end..e]);
        for needle in CELL_NEEDLES {
            let mut cells = Vec::new();
            let mut cpos = 0usize;
            while let Some((cs, ce)) = next_element_with_ci(inner, inner_lc, needle, cpos) {
                cells.push(visible_text(&inner[cs..ce]));
                cpos = ce;
            }
            if !cells.is_empty() {
                rows.push(cells);
                break;
            }
        }
    }
    rows
}
