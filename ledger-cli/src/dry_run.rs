use ledger_core::{Cell, Result};
use ledger_report::SheetSink;

/// Sink used when no spreadsheet is connected: reports what would be written.
#[derive(Debug, Default)]
pub struct DryRunSink {
    pub document: String,
}

impl DryRunSink {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl SheetSink for DryRunSink {
    async fn upsert_tab(&mut self, title: &str) -> Result<()> {
        log::debug!("[dry-run] {}: ensure tab '{title}'", self.document);
        Ok(())
    }

    async fn overwrite_tab(&mut self, title: &str, rows: &[Vec<Cell>]) -> Result<()> {
        println!("  [dry-run] write tab '{title}', {} rows", rows.len());
        Ok(())
    }
}
