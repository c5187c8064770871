// src/csv.rs
use std::io::{self, Write};

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Create a full export string.
/// - `headers`: header cells, emitted only when `include_headers`
/// - `rows`: body rows, already formatted
/// - `sep`: character to be used as field/cell separator
pub fn to_export_string(headers: &[&str], rows: &[Vec<String>], include_headers: bool, sep: char) -> String {
    let mut buf: Vec<u8> = Vec::new();

    if include_headers {
        let h: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let _ = write_row(&mut buf, &h, sep);
    }
    for r in rows {
        let _ = write_row(&mut buf, r, sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let rows = vec![vec![s!("1"), s!("$24,356,207"), s!("say \"hi\"")]];
        let out = to_export_string(&["Rank", "Volume", "Note"], &rows, true, ',');
        assert_eq!(out, "Rank,Volume,Note\n1,\"$24,356,207\",\"say \"\"hi\"\"\"\n");

        let tsv = to_export_string(&["Rank"], &rows, false, '\t');
        assert_eq!(tsv, "1\t$24,356,207\t\"say \"\"hi\"\"\"\n");
    }
}
