//! Raw ledger table as exported by the bookkeeping app.
//!
//! The whole file is loaded into memory. A leading UTF-8 byte-order mark is
//! stripped so spreadsheet exports read the same as plain files.

use ledger_core::{LedgerError, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source, header being line 1
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn get(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Parse CSV text with a header row. Short rows are padded with blanks.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(i + 2);
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.len() < headers.len() {
                cells.resize(headers.len(), String::new());
            }
            rows.push(RawRow { line, cells });
        }

        Ok(RawTable { headers, rows })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Load the ledger CSV at `path`.
pub fn read_source(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    log::info!("Reading ledger {}...", path.display());
    let text = fs::read_to_string(path).map_err(|source| LedgerError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = RawTable::from_csv_str(&text)?;
    log::info!(
        "Reading ledger {}...done ({} rows, {} columns)",
        path.display(),
        table.rows.len(),
        table.headers.len()
    );
    Ok(table)
}
