// src/file.rs

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::config::options::{ExportOptions, StoreOptions};
use crate::error::{Diagnostics, Error, Result};

/// Write the rendered export to the file `export.out_path()` resolves to, or to
/// stdout when no output was given. Returns the path written, if any.
pub fn write_export(export: &ExportOptions, contents: &str) -> Result<Option<PathBuf>> {
    let Some(path) = export.out_path() else {
        let mut out = std::io::stdout().lock();
        out.write_all(contents.as_bytes())?;
        out.flush()?;
        return Ok(None);
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::write(&path, contents)?;
    Ok(Some(path))
}

/// Persist what the page looked like when nothing could be extracted.
/// Returns the files written.
pub fn write_debug_artifacts(store: &StoreOptions, diag: &Diagnostics) -> Result<Vec<PathBuf>> {
    ensure_directory(&store.dir)?;
    let (html_path, text_path) = store.debug_paths();
    let mut written = Vec::new();
    if let Some(html) = &diag.html {
        fs::write(&html_path, html)?;
        written.push(html_path);
    }
    if let Some(text) = &diag.text {
        fs::write(&text_path, text)?;
        written.push(text_path);
    }
    Ok(written)
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Input(format!("Path exists but is not a directory: {}", dir.display())));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}
