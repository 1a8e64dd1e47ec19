// src/file.rs

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::config::options::ExportOptions;
use crate::csv::write_row;
use crate::error::{Error, Result};

/// Write a table to the path `export` resolves to, creating parent directories.
/// Returns the final path written to.
pub fn write_table(export: &ExportOptions, headers: &[String], rows: &[Vec<String>]) -> Result<PathBuf> {
    let path = export.out_path();
    let headers = export.include_headers.then_some(headers);
    write_rows(&path, headers, rows, export.format.delim())?;
    logf!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Create/truncate `path` and write the optional header plus `rows`.
pub fn write_rows(path: &Path, headers: Option<&[String]>, rows: &[Vec<String>], sep: char) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let file = File::create(path)?; // truncate/overwrite
    let mut out = BufWriter::new(file);
    if let Some(h) = headers {
        write_row(&mut out, h, sep)?;
    }
    for row in rows {
        write_row(&mut out, row, sep)?;
    }
    out.flush()?;
    Ok(())
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Config(format!("Path exists but is not a directory: {}", dir.display())));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}
