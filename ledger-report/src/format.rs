//! Presentation for spreadsheet uploads.

use ledger_core::{Cell, LedgerConfig, NormalizedRecord};
use ledger_ingest::processed::{AMOUNT_COLUMN, MONTH_COLUMN, table_rows};

/// `NT$1,234,567` style amount; empty for zero.
pub fn format_amount(amount: i64, symbol: &str) -> String {
    if amount == 0 {
        return String::new();
    }
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{symbol}{sign}{grouped}")
}

/// Header plus detail rows for one month tab: the month-key column is
/// dropped and the base amount becomes a display string.
pub fn monthly_upload_rows<'a>(
    records: impl IntoIterator<Item = &'a NormalizedRecord>,
    participants: &[String],
    config: &LedgerConfig,
) -> Vec<Vec<Cell>> {
    let symbol = config.currency.base_symbol();
    let mut rows = table_rows(records, participants, config);

    for (i, row) in rows.iter_mut().enumerate() {
        if i > 0 {
            if let Some(amount) = row[AMOUNT_COLUMN].as_int() {
                row[AMOUNT_COLUMN] = Cell::Text(format_amount(amount, symbol));
            }
        }
        row.remove(MONTH_COLUMN);
    }
    rows
}

pub fn to_json_rows(rows: &[Vec<Cell>]) -> Vec<Vec<serde_json::Value>> {
    rows.iter()
        .map(|row| row.iter().map(Cell::to_json).collect())
        .collect()
}
