//! Annual report: expense-by-category and income-by-name pivots plus a
//! month-by-month summary.
//!
//! Records are bucketed by calendar month number only. A ledger spanning
//! several years folds them into the same twelve columns.

use ledger_core::{Cell, LedgerError, MONTH_NAMES, NormalizedLedger, NormalizedRecord, ReportLabels, Result};
use ledger_ingest::write_bom_csv;
use std::collections::BTreeMap;
use std::path::Path;

/// Header width: label column, twelve months, yearly total.
pub const REPORT_WIDTH: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub label: String,
    /// January first
    pub months: [i64; 12],
}

impl PivotRow {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            months: [0; 12],
        }
    }

    fn add(&mut self, record: &NormalizedRecord) {
        self.months[record.month_number() as usize - 1] += record.amount_base;
    }

    pub fn total(&self) -> i64 {
        self.months.iter().sum()
    }

    /// Amount for calendar month `month` (1–12).
    pub fn month(&self, month: u32) -> i64 {
        self.months[month as usize - 1]
    }

    fn to_cells(&self, label: &str) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(REPORT_WIDTH);
        cells.push(Cell::text(label));
        cells.extend(self.months.iter().map(|&m| Cell::Int(m)));
        cells.push(Cell::Int(self.total()));
        cells
    }
}

/// Labelled rows sorted ascending, plus a totals row over every record fed
/// in, including those whose label was blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotTable {
    pub rows: Vec<PivotRow>,
    pub totals: PivotRow,
}

impl PivotTable {
    fn build<'a>(
        records: impl IntoIterator<Item = &'a NormalizedRecord>,
        label_of: impl Fn(&NormalizedRecord) -> &str,
    ) -> Self {
        let mut rows: BTreeMap<String, PivotRow> = BTreeMap::new();
        let mut totals = PivotRow::new("");

        for record in records {
            totals.add(record);
            let label = label_of(record);
            if label.trim().is_empty() {
                continue;
            }
            rows.entry(label.to_string())
                .or_insert_with(|| PivotRow::new(label))
                .add(record);
        }

        Self {
            rows: rows.into_values().collect(),
            totals,
        }
    }

    pub fn row(&self, label: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    fn to_rows(&self, header: &[Cell], total_label: &str) -> Vec<Vec<Cell>> {
        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(header.to_vec());
        out.extend(self.rows.iter().map(|r| r.to_cells(&r.label)));
        out.push(self.totals.to_cells(total_label));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    pub expense: [i64; 12],
    pub income: [i64; 12],
}

impl MonthlySummary {
    pub fn expense_total(&self) -> i64 {
        self.expense.iter().sum()
    }

    pub fn income_total(&self) -> i64 {
        self.income.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnualReport {
    pub year: i32,
    pub expense: PivotTable,
    pub income: PivotTable,
    pub summary: MonthlySummary,
}

impl AnnualReport {
    /// Aggregate `ledger`. Without an explicit `year` the first record's year
    /// is used; an empty ledger then has no year and is rejected.
    pub fn build(ledger: &NormalizedLedger, year: Option<i32>) -> Result<Self> {
        let year = year
            .or_else(|| ledger.first_year())
            .ok_or(LedgerError::EmptyLedger)?;

        let expense = PivotTable::build(
            ledger.records.iter().filter(|r| r.is_expense()),
            |r| r.category.as_str(),
        );
        let income = PivotTable::build(
            ledger.records.iter().filter(|r| r.is_income()),
            |r| r.name.as_str(),
        );
        let summary = MonthlySummary {
            expense: expense.totals.months,
            income: income.totals.months,
        };

        log::info!(
            "Built {} report: {} expense categories, {} income names",
            year,
            expense.rows.len(),
            income.rows.len()
        );

        Ok(Self {
            year,
            expense,
            income,
            summary,
        })
    }

    /// The three tables stacked as raw rows, each padded to the header width.
    pub fn to_rows(&self, labels: &ReportLabels) -> Vec<Vec<Cell>> {
        let mut header = Vec::with_capacity(REPORT_WIDTH);
        header.push(Cell::text(labels.corner.as_str()));
        header.extend(MONTH_NAMES.iter().map(|&m| Cell::text(m)));
        header.push(Cell::text(labels.yearly_total.as_str()));

        let blank = vec![Cell::empty(); REPORT_WIDTH];

        let mut rows = self.expense.to_rows(&header, &labels.total_expense);

        rows.push(blank.clone());
        rows.push(blank.clone());
        rows.extend(self.income.to_rows(&header, &labels.total_income));

        rows.push(blank.clone());
        rows.push(blank);
        rows.push(vec![
            Cell::text(labels.summary_month.as_str()),
            Cell::text(labels.summary_expense.as_str()),
            Cell::text(labels.summary_income.as_str()),
        ]);
        for (i, name) in MONTH_NAMES.iter().enumerate() {
            rows.push(vec![
                Cell::text(*name),
                Cell::Int(self.summary.expense[i]),
                Cell::Int(self.summary.income[i]),
            ]);
        }
        rows.push(vec![
            Cell::text(labels.annual_total.as_str()),
            Cell::Int(self.summary.expense_total()),
            Cell::Int(self.summary.income_total()),
        ]);

        for row in &mut rows {
            row.resize(REPORT_WIDTH, Cell::empty());
        }
        rows
    }
}

/// Headerless CSV of [`AnnualReport::to_rows`], with byte-order mark.
pub fn write_annual_report(path: &Path, rows: &[Vec<Cell>]) -> Result<()> {
    log::info!("Saving annual report to {}...", path.display());
    write_bom_csv(path, rows)?;
    log::info!("Saving annual report to {}...done", path.display());
    Ok(())
}
