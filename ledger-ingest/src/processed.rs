//! Processed-data and per-month files.
//!
//! Files are comma-delimited UTF-8 with a byte-order mark so spreadsheet
//! apps detect the encoding. Amounts are written as raw integers; display
//! formatting happens only on upload.

use chrono::NaiveDate;
use ledger_core::{Cell, LedgerConfig, LedgerError, NormalizedLedger, NormalizedRecord, Result, TransactionType};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::group::group_by_month;
use crate::source::{RawRow, RawTable};

const BOM: &[u8] = "\u{feff}".as_bytes();

/// Position of the month-key column in [`header_row`] and [`record_row`].
pub const MONTH_COLUMN: usize = 1;
/// Position of the base-currency amount column.
pub const AMOUNT_COLUMN: usize = 5;

/// Overwrite `path` with `rows`, creating parent directories as needed.
pub fn write_bom_csv(path: &Path, rows: &[Vec<Cell>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(BOM)?;

    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    for row in rows {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Header of the normalized table: the fixed columns, then one per participant.
pub fn header_row(participants: &[String], config: &LedgerConfig) -> Vec<Cell> {
    let c = &config.source.columns;
    let mut header: Vec<Cell> = [
        &c.date,
        &c.month,
        &c.transaction_type,
        &c.category,
        &c.name,
        &c.amount,
        &c.currency,
    ]
    .into_iter()
    .map(|s| Cell::text(s.as_str()))
    .collect();
    header.extend(participants.iter().map(|p| Cell::text(p.as_str())));
    header
}

pub fn record_row(record: &NormalizedRecord, participants: &[String], config: &LedgerConfig) -> Vec<Cell> {
    let mut row = vec![
        Cell::text(record.date.format(&config.formats.date).to_string()),
        Cell::text(record.month_key.as_str()),
        Cell::text(record.transaction_type.label()),
        Cell::text(record.category.as_str()),
        Cell::text(record.name.as_str()),
        Cell::Int(record.amount_base),
        Cell::text(record.currency.as_str()),
    ];
    row.extend(participants.iter().map(|p| Cell::Int(record.settled(p))));
    row
}

/// Header plus one row per record.
pub fn table_rows<'a>(
    records: impl IntoIterator<Item = &'a NormalizedRecord>,
    participants: &[String],
    config: &LedgerConfig,
) -> Vec<Vec<Cell>> {
    let mut rows = vec![header_row(participants, config)];
    rows.extend(records.into_iter().map(|r| record_row(r, participants, config)));
    rows
}

pub fn write_processed(path: &Path, ledger: &NormalizedLedger, config: &LedgerConfig) -> Result<()> {
    log::info!("Saving processed data to {}...", path.display());
    let rows = table_rows(&ledger.records, &ledger.participants, config);
    write_bom_csv(path, &rows)?;
    log::info!("Saving processed data to {}...done ({} records)", path.display(), ledger.len());
    Ok(())
}

/// One file per month key, named from the monthly filename template.
/// Returns the month keys written, in encounter order.
pub fn write_monthly_files(ledger: &NormalizedLedger, config: &LedgerConfig) -> Result<Vec<String>> {
    let mut written = Vec::new();
    for group in group_by_month(&ledger.records) {
        let path = config.output.monthly_path(group.month_key);
        let rows = table_rows(group.records.iter().copied(), &ledger.participants, config);
        write_bom_csv(&path, &rows)?;
        log::info!("Saved {} ({} records)", path.display(), group.len());
        written.push(group.month_key.to_string());
    }
    Ok(written)
}

/// Read a file written by [`write_processed`] back into a ledger.
pub fn read_processed(path: &Path, config: &LedgerConfig) -> Result<NormalizedLedger> {
    let text = fs::read_to_string(path).map_err(|source| LedgerError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = RawTable::from_csv_str(&text)?;
    let c = &config.source.columns;
    let fixed = [
        &c.date,
        &c.month,
        &c.transaction_type,
        &c.category,
        &c.name,
        &c.amount,
        &c.currency,
    ];

    let mut index = Vec::with_capacity(fixed.len());
    for name in fixed {
        let i = table.column(name).ok_or_else(|| LedgerError::MissingColumn {
            column: name.clone(),
        })?;
        index.push(i);
    }

    let participants: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !index.contains(i))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let records = table
        .rows
        .iter()
        .map(|row| parse_processed_row(row, &index, &participants, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedLedger {
        participants: participants.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}

fn parse_processed_row(
    row: &RawRow,
    index: &[usize],
    participants: &[(usize, String)],
    config: &LedgerConfig,
) -> Result<NormalizedRecord> {
    let malformed = |message: String| LedgerError::Malformed {
        row: row.line,
        message,
    };
    let int = |i: usize| -> Result<i64> {
        let raw = row.get(i).trim();
        raw.parse::<i64>()
            .map_err(|_| malformed(format!("'{raw}' is not an integer")))
    };

    let raw_date = row.get(index[0]).trim();
    let date = NaiveDate::parse_from_str(raw_date, &config.formats.date).map_err(|_| {
        LedgerError::DateParse {
            row: row.line,
            value: raw_date.to_string(),
            format: config.formats.date.clone(),
        }
    })?;
    let transaction_type: TransactionType = row.get(index[2]).parse().map_err(malformed)?;

    let participant_amounts = participants
        .iter()
        .map(|(i, name)| Ok((name.clone(), int(*i)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(NormalizedRecord {
        date,
        month_key: row.get(index[1]).to_string(),
        transaction_type,
        category: row.get(index[3]).to_string(),
        name: row.get(index[4]).to_string(),
        amount_base: int(index[5])?,
        currency: row.get(index[6]).to_string(),
        participant_amounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;

    const SOURCE: &str = "\
日期,類別,名稱,金額,幣別,匯率,Bob(B),Alice(A),Alice(B)
2024年1月5日,Food,Lunch,100,TWD,1,,12.7,5
2024/01/20,Food,\"Dinner, late\",200,TWD,1,50,,
2024/02/01,收入,Salary,\"5,000\",TWD,1,,,
2024/02/03,,Snack,30.5,USD,31.5,,,
";

    fn ledger(config: &LedgerConfig) -> NormalizedLedger {
        let table = RawTable::from_csv_str(SOURCE).unwrap();
        Normalizer::new(config).unwrap().normalize(&table).unwrap()
    }

    #[test]
    fn test_processed_round_trip() {
        let config = LedgerConfig::default();
        let original = ledger(&config);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("processed.csv");

        write_processed(&path, &original, &config).unwrap();
        let reread = read_processed(&path, &config).unwrap();
        assert_eq!(reread, original);
    }

    #[test]
    fn test_processed_file_layout() {
        let config = LedgerConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        write_processed(&path, &ledger(&config), &config).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next().unwrap(),
            "日期,Month,交易類型,類別,名稱,金額,幣別,Alice,Bob"
        );
        assert_eq!(lines.next().unwrap(), "2024/01/05,2024-01,支出,Food,Lunch,100,TWD,12,0");
        assert_eq!(
            lines.next().unwrap(),
            "2024/01/20,2024-01,支出,Food,\"Dinner, late\",200,TWD,0,50"
        );
        assert_eq!(lines.next().unwrap(), "2024/02/01,2024-02,收入,收入,Salary,5000,TWD,0,0");
        // 30.5 × 31.5 = 960.75
        assert_eq!(lines.next().unwrap(), "2024/02/03,2024-02,支出,,Snack,961,USD,0,0");
    }

    #[test]
    fn test_monthly_files() {
        let mut config = LedgerConfig::default();
        let dir = tempfile::tempdir().unwrap();
        config.output.dir = dir.path().to_path_buf();

        let written = write_monthly_files(&ledger(&config), &config).unwrap();
        assert_eq!(written, vec!["2024-01", "2024-02"]);

        let january = read_processed(&config.output.monthly_path("2024-01"), &config).unwrap();
        assert_eq!(january.len(), 2);
        assert!(january.records.iter().all(|r| r.month_key == "2024-01"));
    }

    #[test]
    fn test_read_processed_rejects_bad_amount() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "日期,Month,交易類型,類別,名稱,金額,幣別\n2024/01/05,2024-01,支出,Food,Lunch,NT$100,TWD\n",
        )
        .unwrap();
        let err = read_processed(&path, &LedgerConfig::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Malformed { row: 2, .. }));
    }
}
