//! Publishing to a spreadsheet document.
//!
//! The transport lives behind [`SheetSink`]; opening the document is the
//! sink's constructor. Uploads stop at the first failing tab.

use ledger_core::{Cell, LedgerConfig, NormalizedLedger, Result};
use ledger_ingest::group_by_month;

use crate::format::monthly_upload_rows;

#[allow(async_fn_in_trait)]
pub trait SheetSink {
    /// Create the tab when the document has none by that title.
    async fn upsert_tab(&mut self, title: &str) -> Result<()>;

    /// Clear the tab, then write `rows` starting at A1.
    async fn overwrite_tab(&mut self, title: &str, rows: &[Vec<Cell>]) -> Result<()>;
}

/// Tabs written, in upload order, with their row counts (header included).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub tabs: Vec<(String, usize)>,
}

pub async fn publish_tab<S: SheetSink>(sink: &mut S, title: &str, rows: &[Vec<Cell>]) -> Result<()> {
    log::info!("Uploading tab {title} ({} rows)...", rows.len());
    sink.upsert_tab(title).await?;
    sink.overwrite_tab(title, rows).await?;
    log::info!("Uploading tab {title}...done");
    Ok(())
}

/// One `Data_<month>` tab per month in encounter order, then the annual
/// report tab when `annual_rows` is given.
pub async fn publish<S: SheetSink>(
    sink: &mut S,
    ledger: &NormalizedLedger,
    annual_rows: Option<&[Vec<Cell>]>,
    config: &LedgerConfig,
) -> Result<PublishSummary> {
    let mut summary = PublishSummary::default();

    for group in group_by_month(&ledger.records) {
        let title = config.sheets.monthly_tab(group.month_key);
        let rows = monthly_upload_rows(group.records.iter().copied(), &ledger.participants, config);
        publish_tab(sink, &title, &rows).await?;
        summary.tabs.push((title, rows.len()));
    }

    if let Some(rows) = annual_rows {
        let title = config.sheets.annual_tab.as_str();
        publish_tab(sink, title, rows).await?;
        summary.tabs.push((title.to_string(), rows.len()));
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledger_core::{LedgerError, NormalizedRecord, TransactionType};
    use std::collections::{BTreeMap, HashMap};

    #[derive(Default)]
    struct RecordingSink {
        tabs: HashMap<String, Vec<Vec<Cell>>>,
        calls: Vec<String>,
        fail_on: Option<String>,
    }

    impl SheetSink for RecordingSink {
        async fn upsert_tab(&mut self, title: &str) -> Result<()> {
            self.calls.push(format!("upsert {title}"));
            self.tabs.entry(title.to_string()).or_default();
            Ok(())
        }

        async fn overwrite_tab(&mut self, title: &str, rows: &[Vec<Cell>]) -> Result<()> {
            if self.fail_on.as_deref() == Some(title) {
                return Err(LedgerError::sink_write(title, "quota exceeded"));
            }
            self.calls.push(format!("write {title}"));
            self.tabs.insert(title.to_string(), rows.to_vec());
            Ok(())
        }
    }

    fn ledger() -> NormalizedLedger {
        let record = |m: u32, amount: i64| {
            let date = NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
            NormalizedRecord {
                date,
                month_key: date.format("%Y-%m").to_string(),
                transaction_type: TransactionType::Expense,
                category: "Food".to_string(),
                name: "Lunch".to_string(),
                amount_base: amount,
                currency: "TWD".to_string(),
                participant_amounts: BTreeMap::new(),
            }
        };
        NormalizedLedger {
            participants: Vec::new(),
            records: vec![record(2, 10), record(1, 20), record(2, 30)],
        }
    }

    #[tokio::test]
    async fn test_publish_monthly_then_annual() {
        let mut sink = RecordingSink::default();
        let annual = vec![vec![Cell::text("類別/月份")]];
        let summary = publish(&mut sink, &ledger(), Some(&annual), &LedgerConfig::default())
            .await
            .unwrap();

        assert_eq!(
            summary.tabs,
            vec![
                ("Data_2024-02".to_string(), 3),
                ("Data_2024-01".to_string(), 2),
                ("Annual_Expense_Report".to_string(), 1),
            ]
        );
        assert_eq!(
            sink.calls,
            vec![
                "upsert Data_2024-02",
                "write Data_2024-02",
                "upsert Data_2024-01",
                "write Data_2024-01",
                "upsert Annual_Expense_Report",
                "write Annual_Expense_Report",
            ]
        );
        assert_eq!(sink.tabs["Data_2024-02"][1][4], Cell::text("NT$10"));
    }

    #[tokio::test]
    async fn test_failed_tab_aborts_remaining_uploads() {
        let mut sink = RecordingSink {
            fail_on: Some("Data_2024-01".to_string()),
            ..RecordingSink::default()
        };
        let err = publish(&mut sink, &ledger(), None, &LedgerConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::SinkWrite { ref tab, .. } if tab == "Data_2024-01"));
        assert!(!sink.calls.iter().any(|c| c.contains("Annual")));
        assert_eq!(sink.calls.last().map(String::as_str), Some("upsert Data_2024-01"));
    }
}
