//! Raw rows → normalized records.
//!
//! Two phases: the header is resolved into a [`LedgerSchema`] first, then
//! every row is processed against that fixed schema. A date that does not
//! parse aborts the run; numbers that do not parse become zero.

use ledger_core::{LedgerConfig, LedgerError, NormalizedLedger, NormalizedRecord, Result, TransactionType};
use std::collections::BTreeMap;

use crate::coerce::{coerce_number, settled_amount, to_base_currency};
use crate::dates::{month_key, parse_ledger_date};
use crate::processed::write_processed;
use crate::schema::LedgerSchema;
use crate::source::{RawRow, RawTable, read_source};

pub struct Normalizer<'a> {
    config: &'a LedgerConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn normalize(&self, table: &RawTable) -> Result<NormalizedLedger> {
        let schema = LedgerSchema::resolve(&table.headers, &self.config.source.columns)?;
        log::debug!("participants: {:?}", schema.participant_names());

        let mut records = Vec::with_capacity(table.rows.len());
        let mut dropped = 0usize;
        for row in &table.rows {
            if row.is_blank() {
                dropped += 1;
                continue;
            }
            match self.normalize_row(row, &schema)? {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        log::info!(
            "Normalized {} records ({} rows dropped)",
            records.len(),
            dropped
        );

        Ok(NormalizedLedger {
            participants: schema.participant_names(),
            records,
        })
    }

    /// `Ok(None)` for a row without a date.
    fn normalize_row(&self, row: &RawRow, schema: &LedgerSchema) -> Result<Option<NormalizedRecord>> {
        let formats = &self.config.formats;

        let raw_date = row.get(schema.date).trim();
        if raw_date.is_empty() {
            log::debug!("line {}: no date, row dropped", row.line);
            return Ok(None);
        }
        let date = parse_ledger_date(raw_date, &formats.date).ok_or_else(|| LedgerError::DateParse {
            row: row.line,
            value: raw_date.to_string(),
            format: formats.date.clone(),
        })?;

        let category = row.get(schema.category).trim().to_string();
        let transaction_type = TransactionType::classify(&category, &self.config.source.income_marker);

        let amount = coerce_number(row.get(schema.amount));
        let rate = coerce_number(row.get(schema.exchange_rate));

        let participant_amounts: BTreeMap<String, i64> = schema
            .participants
            .iter()
            .map(|p| {
                let settled = settled_amount(p.columns.iter().map(|&i| coerce_number(row.get(i))));
                (p.name.clone(), settled)
            })
            .collect();

        Ok(Some(NormalizedRecord {
            date,
            month_key: month_key(date, &formats.month),
            transaction_type,
            category,
            name: row.get(schema.name).trim().to_string(),
            amount_base: to_base_currency(amount, rate),
            currency: row.get(schema.currency).trim().to_string(),
            participant_amounts,
        }))
    }
}

/// Read the configured source, normalize it, and write the processed file
/// when enabled.
pub fn load_and_normalize(config: &LedgerConfig) -> Result<NormalizedLedger> {
    let normalizer = Normalizer::new(config)?;
    let table = read_source(&config.source.path)?;
    let ledger = normalizer.normalize(&table)?;

    if config.output.write_processed {
        write_processed(&config.output.processed_path(), &ledger, config)?;
    }

    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "日期,類別,名稱,金額,幣別,匯率,Alice(A),Alice(B),Bob(B)";

    fn normalize(body: &str) -> Result<NormalizedLedger> {
        let config = LedgerConfig::default();
        let table = RawTable::from_csv_str(&format!("{HEADER}\n{body}"))?;
        Normalizer::new(&config)?.normalize(&table)
    }

    #[test]
    fn test_normalizes_locale_row() {
        let ledger = normalize("2024年3月9日,餐飲,午餐,\"1,000\",JPY,0.2113,12.7,5,\n").unwrap();
        assert_eq!(ledger.participants, vec!["Alice", "Bob"]);
        let r = &ledger.records[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(r.month_key, "2024-03");
        assert_eq!(r.transaction_type, TransactionType::Expense);
        assert_eq!(r.category, "餐飲");
        assert_eq!(r.name, "午餐");
        assert_eq!(r.amount_base, 211);
        assert_eq!(r.currency, "JPY");
        assert_eq!(r.settled("Alice"), 12);
        assert_eq!(r.settled("Bob"), 0);
    }

    #[test]
    fn test_income_marker_sets_type() {
        let ledger = normalize("2024/02/25,收入,Salary,5000,TWD,1,,,\n").unwrap();
        assert!(ledger.records[0].is_income());
        assert_eq!(ledger.records[0].amount_base, 5000);
    }

    #[test]
    fn test_padded_income_marker_is_trimmed_before_classifying() {
        let ledger = normalize("2024/02/25, 收入 ,Salary,5000,TWD,1,,,\n").unwrap();
        let r = &ledger.records[0];
        assert_eq!(r.transaction_type, TransactionType::Income);
        assert_eq!(r.category, "收入");
    }

    #[test]
    fn test_blank_and_dateless_rows_are_dropped() {
        let ledger = normalize(
            ",,,,,,,,\n,餐飲,午餐,100,TWD,1,,,\n2024/01/02,餐飲,晚餐,200,TWD,1,,,\n",
        )
        .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records[0].name, "晚餐");
    }

    #[test]
    fn test_bad_date_aborts_whole_run() {
        let err = normalize("2024/01/02,餐飲,晚餐,200,TWD,1,,,\n2024/02/30,餐飲,午餐,100,TWD,1,,,\n")
            .unwrap_err();
        match err {
            LedgerError::DateParse { row, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(value, "2024/02/30");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_numbers_become_zero() {
        let ledger = normalize("2024/01/02,餐飲,晚餐,abc,TWD,1,x,,?\n").unwrap();
        let r = &ledger.records[0];
        assert_eq!(r.amount_base, 0);
        assert_eq!(r.settled("Alice"), 0);
        assert_eq!(r.settled("Bob"), 0);
    }

    #[test]
    fn test_every_record_has_every_participant() {
        let ledger = normalize("2024/01/02,餐飲,晚餐,1,TWD,1,,,\n2024/01/03,餐飲,午餐,1,TWD,1,3,,4\n").unwrap();
        for r in &ledger.records {
            let names: Vec<_> = r.participant_amounts.keys().cloned().collect();
            assert_eq!(names, ledger.participants);
        }
    }

    #[test]
    fn test_header_only_gives_empty_ledger() {
        let ledger = normalize("").unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.participants, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let body = "2024年1月5日,餐飲,午餐,100,TWD,1,,,\n2024/12/31,交通,捷運,30,TWD,1,,,\n";
        let a = normalize(body).unwrap();
        let b = normalize(body).unwrap();
        assert_eq!(a, b);
        let keys: Vec<_> = a.records.iter().map(|r| r.month_key.as_str()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-12"]);
    }

    #[test]
    fn test_load_and_normalize_writes_processed_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ledger.csv");
        std::fs::write(&source, format!("{HEADER}\n2024/01/02,餐飲,晚餐,200,TWD,1,,,\n")).unwrap();

        let mut config = LedgerConfig::default().with_source(&source);
        config.output.dir = dir.path().join("out");

        let ledger = load_and_normalize(&config).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(config.output.processed_path().exists());
    }
}
