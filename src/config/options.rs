// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub pipeline: PipelineOptions,
    pub store: StoreOptions,
    pub export: ExportOptions,
}

impl AppOptions {
    /// Read a TOML options file. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| Error::Config { path: path.to_path_buf(), source })
    }
}

/// Thresholds of the extraction pipeline. Defaults are the named constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub top_n: usize,
    pub sufficient_rows: usize,
    pub payload_sample: usize,
    pub payload_min_array: usize,
    pub payload_min_score: usize,
    pub plausible_volume: f64,
    pub min_cells: usize,
    pub min_table_rows: usize,
    pub window_before: usize,
    pub window_after: usize,
    pub max_text_lines: usize,
    /// Evaluate every strategy up front on worker threads; priority still decides.
    pub parallel: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_n: TOP_N,
            sufficient_rows: SUFFICIENT_ROWS,
            payload_sample: PAYLOAD_SAMPLE,
            payload_min_array: PAYLOAD_MIN_ARRAY,
            payload_min_score: PAYLOAD_MIN_SCORE,
            plausible_volume: PLAUSIBLE_VOLUME,
            min_cells: MIN_CELLS,
            min_table_rows: MIN_TABLE_ROWS,
            window_before: WINDOW_BEFORE,
            window_after: WINDOW_AFTER,
            max_text_lines: MAX_TEXT_LINES,
            parallel: false,
        }
    }
}

impl PipelineOptions {
    /// `top_n` is capped at the 20 a result may hold.
    pub fn top_n(&self) -> usize {
        self.top_n.clamp(1, TOP_N)
    }

    /// An empty attempt is never enough.
    pub fn sufficient_rows(&self) -> usize {
        self.sufficient_rows.max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub dir: PathBuf,
    pub snapshot_file: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { dir: PathBuf::from(STORE_DIR), snapshot_file: s!(SNAPSHOT_FILE) }
    }
}

impl StoreOptions {
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(&self.snapshot_file)
    }

    pub fn debug_paths(&self) -> (PathBuf, PathBuf) {
        (self.dir.join(DEBUG_HTML), self.dir.join(DEBUG_TEXT))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv", ExportFormat::Json => "json" }
    }

    /// Cell separator; `None` for non-tabular formats.
    pub fn delim(&self) -> Option<char> {
        match self { ExportFormat::Csv => Some(','), ExportFormat::Tsv => Some('\t'), ExportFormat::Json => None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// File or directory; `None` writes to stdout.
    pub out: Option<PathBuf>,
    pub include_headers: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { format: ExportFormat::Csv, out: None, include_headers: true }
    }
}

impl ExportOptions {
    /// Resolved output file. A directory (existing, or spelled with a trailing
    /// separator) gets the default file name with the format's extension.
    pub fn out_path(&self) -> Option<PathBuf> {
        let out = self.out.as_ref()?;
        if crate::file::looks_like_dir_hint(out) || out.is_dir() {
            return Some(out.join(join!(DEFAULT_FILE, ".", self.format.ext())));
        }
        Some(out.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let opts: AppOptions = toml::from_str(
            r#"
            [pipeline]
            sufficient_rows = 5
            parallel = true

            [export]
            format = "tsv"
            "#,
        )
        .unwrap();
        assert_eq!(opts.pipeline.sufficient_rows, 5);
        assert!(opts.pipeline.parallel);
        assert_eq!(opts.pipeline.payload_sample, PAYLOAD_SAMPLE);
        assert_eq!(opts.export.format, ExportFormat::Tsv);
        assert_eq!(opts.store, StoreOptions::default());
    }

    #[test]
    fn missing_file_is_default() {
        let opts = AppOptions::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(opts, AppOptions::default());
    }

    #[test]
    fn dir_hint_gets_default_file_name() {
        let export = ExportOptions { format: ExportFormat::Json, out: Some(PathBuf::from("out/")), include_headers: false };
        assert_eq!(export.out_path(), Some(PathBuf::from("out/").join("top20.json")));
        assert_eq!(ExportOptions::default().out_path(), None);
    }

    #[test]
    fn top_n_is_capped() {
        let opts = PipelineOptions { top_n: 50, ..PipelineOptions::default() };
        assert_eq!(opts.top_n(), 20);
    }

    #[test]
    fn zero_sufficient_rows_means_one() {
        let opts = PipelineOptions { sufficient_rows: 0, ..PipelineOptions::default() };
        assert_eq!(opts.sufficient_rows(), 1);
    }
}
