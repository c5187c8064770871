// src/cli.rs
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{ArgAction, Parser, ValueEnum};
use serde_json::Value;
use tracing::warn;

use crate::config::options::{AppOptions, ExportFormat};
use crate::error::{Error, Result};
use crate::file;
use crate::pipeline::Pipeline;
use crate::progress::Progress;
use crate::record::Strategy;
use crate::report::Report;
use crate::snapshot::{CapturedResponse, PageSnapshot};
use crate::store::{self, PersistedSnapshot};

#[derive(Parser, Debug)]
#[command(name = "lb_scrape", version, about = "Extract the Top 20 leaderboard from a captured page and diff it against yesterday")]
pub struct Args {
    /// Page snapshot bundle (JSON)
    #[arg(long, value_name = "FILE")]
    pub bundle: Option<PathBuf>,

    /// Serialized page markup; table/grid rows and text are derived from it
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Flattened visible page text
    #[arg(long, value_name = "FILE")]
    pub text: Option<PathBuf>,

    /// OCR transcription of a page screenshot
    #[arg(long, value_name = "FILE")]
    pub ocr: Option<PathBuf>,

    /// Captured response body, repeatable
    #[arg(long = "payload", value_name = "URL=FILE")]
    pub payloads: Vec<String>,

    #[arg(long, value_name = "FILE", default_value = "lb_scrape.toml")]
    pub config: PathBuf,

    /// Directory holding the baseline snapshot, logs and debug artifacts
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Output file or directory (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub include_headers: Option<bool>,

    /// Evaluate all strategies concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Do not replace the stored baseline
    #[arg(long)]
    pub no_save: bool,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Csv,
    Tsv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

impl Args {
    /// Command-line values win over the config file.
    pub fn apply(&self, app: &mut AppOptions) {
        if let Some(dir) = &self.store { app.store.dir = dir.clone(); }
        if let Some(out) = &self.out { app.export.out = Some(out.clone()); }
        if let Some(f) = self.format { app.export.format = f.into(); }
        if let Some(h) = self.include_headers { app.export.include_headers = h; }
        if self.parallel { app.pipeline.parallel = true; }
    }

    /// Assemble the page snapshot from the bundle and the single-representation files.
    pub fn load_snapshot(&self) -> Result<PageSnapshot> {
        let mut page = match &self.bundle {
            Some(p) => PageSnapshot::load(p)?,
            None => PageSnapshot::default(),
        };
        if let Some(p) = &self.text { page.text = Some(fs::read_to_string(p)?); }
        if let Some(p) = &self.ocr { page.ocr_text = Some(fs::read_to_string(p)?); }
        for entry in &self.payloads {
            let (url, path) = entry
                .rsplit_once('=')
                .ok_or_else(|| Error::Input(format!("--payload expects URL=FILE, got {entry:?}")))?;
            let body: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            page.responses.push(CapturedResponse { url: s!(url), body });
        }
        let html = match &self.html {
            Some(p) => Some(fs::read_to_string(p)?),
            None => page.html.take(),
        };
        if let Some(html) = html {
            page = page.with_html(html);
        }
        Ok(page)
    }
}

/// Prints one line per strategy to stderr.
struct StderrProgress;

impl Progress for StderrProgress {
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn attempt_done(&mut self, strategy: Strategy, accepted: usize) {
        eprintln!("  {:<8} {accepted} records", strategy.label());
    }
}

pub fn run() -> color_eyre::Result<()> {
    execute(&Args::parse())
}

/// One capture: read the baseline, extract, export the diff, persist today's list.
pub fn execute(args: &Args) -> color_eyre::Result<()> {
    let mut app = AppOptions::load(&args.config)?;
    args.apply(&mut app);
    let _guard = crate::log::init(&app.store.dir, args.verbose);

    let snapshot_path = app.store.snapshot_path();
    let baseline = store::load_or_warn(&snapshot_path);

    let page = args.load_snapshot()?;
    let pipeline = Pipeline::new(app.pipeline.clone());
    let result = match pipeline.run(&page, Some(&mut StderrProgress)) {
        Ok(r) => r,
        Err(no_data) => {
            match file::write_debug_artifacts(&app.store, &no_data.diagnostics) {
                Ok(paths) => paths.iter().for_each(|p| eprintln!("Wrote {}", p.display())),
                Err(e) => warn!(error = %e, "could not write debug artifacts"),
            }
            return Err(Error::NoData(no_data).into());
        }
    };

    let now = Utc::now();
    let report = Report::build(&result, baseline.as_ref(), now);
    if let Some(path) = file::write_export(&app.export, &report.render(&app.export)?)? {
        eprintln!("Wrote {}", path.display());
    }

    if !args.no_save {
        store::save(&snapshot_path, &PersistedSnapshot::from_result(&result, now))?;
    }
    Ok(())
}
