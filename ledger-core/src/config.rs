//! Pipeline configuration.
//!
//! Every section is optional in the TOML file; missing keys take the defaults
//! below. The struct is passed by reference into each stage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub source: SourceSection,
    pub formats: FormatSection,
    pub output: OutputSection,
    pub sheets: SheetsSection,
    pub currency: CurrencySection,
    pub labels: ReportLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub path: PathBuf,
    /// Category value that marks a line as income
    pub income_marker: String,
    pub columns: ColumnNames,
}

/// Header names of the required source columns. They are reused as the
/// header names of the processed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub category: String,
    pub name: String,
    pub amount: String,
    pub currency: String,
    pub exchange_rate: String,
    pub month: String,
    pub transaction_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSection {
    /// chrono format applied after the locale markers are rewritten
    pub date: String,
    /// chrono format producing the month key
    pub month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub processed_filename: String,
    /// Must contain `{month}`
    pub monthly_filename: String,
    /// Must contain `{year}`
    pub annual_filename: String,
    pub write_processed: bool,
    pub write_monthly: bool,
    pub write_annual_report: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    /// Service-account key file
    pub credentials: PathBuf,
    /// Spreadsheet document, looked up by name
    pub document: String,
    pub monthly_tab_prefix: String,
    pub annual_tab: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySection {
    /// Currency every `amount_base` is expressed in
    pub base: String,
    pub symbols: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLabels {
    pub corner: String,
    pub yearly_total: String,
    pub total_expense: String,
    pub total_income: String,
    pub summary_month: String,
    pub summary_expense: String,
    pub summary_income: String,
    pub annual_total: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rawdata/ledger.csv"),
            income_marker: "收入".to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "日期".to_string(),
            category: "類別".to_string(),
            name: "名稱".to_string(),
            amount: "金額".to_string(),
            currency: "幣別".to_string(),
            exchange_rate: "匯率".to_string(),
            month: "Month".to_string(),
            transaction_type: "交易類型".to_string(),
        }
    }
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            date: "%Y/%m/%d".to_string(),
            month: "%Y-%m".to_string(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("temp"),
            processed_filename: "processed_data.csv".to_string(),
            monthly_filename: "monthly_{month}.csv".to_string(),
            annual_filename: "annual_report_{year}.csv".to_string(),
            write_processed: true,
            write_monthly: false,
            write_annual_report: true,
        }
    }
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from("credential/service_account.json"),
            document: "Household Ledger".to_string(),
            monthly_tab_prefix: "Data_".to_string(),
            annual_tab: "Annual_Expense_Report".to_string(),
        }
    }
}

impl Default for CurrencySection {
    fn default() -> Self {
        let symbols = [
            ("TWD", "NT$"),
            ("JPY", "¥"),
            ("USD", "$"),
            ("EUR", "€"),
            ("CNY", "¥"),
        ]
        .into_iter()
        .map(|(code, glyph)| (code.to_string(), glyph.to_string()))
        .collect();

        Self {
            base: "TWD".to_string(),
            symbols,
        }
    }
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            corner: "類別/月份".to_string(),
            yearly_total: "年度總計".to_string(),
            total_expense: "總支出".to_string(),
            total_income: "總收入".to_string(),
            summary_month: "Month".to_string(),
            summary_expense: "支出".to_string(),
            summary_income: "收入".to_string(),
            annual_total: "年度總計".to_string(),
        }
    }
}

impl CurrencySection {
    /// Display glyph for the base currency; falls back to the code itself.
    pub fn base_symbol(&self) -> &str {
        self.symbols
            .get(&self.base)
            .map(String::as_str)
            .unwrap_or(&self.base)
    }
}

impl OutputSection {
    pub fn processed_path(&self) -> PathBuf {
        self.dir.join(&self.processed_filename)
    }

    pub fn monthly_path(&self, month_key: &str) -> PathBuf {
        self.dir
            .join(self.monthly_filename.replace("{month}", month_key))
    }

    pub fn annual_path(&self, year: i32) -> PathBuf {
        self.dir
            .join(self.annual_filename.replace("{year}", &year.to_string()))
    }
}

impl SheetsSection {
    pub fn monthly_tab(&self, month_key: &str) -> String {
        format!("{}{}", self.monthly_tab_prefix, month_key)
    }
}

impl LedgerConfig {
    /// Same configuration reading a different source file.
    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.source.path = path.as_ref().to_path_buf();
        self
    }

    pub fn validate(&self) -> Result<()> {
        // Records carry dates only; time and zone directives fail to render.
        let sample = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap_or_default();
        for format in [&self.formats.date, &self.formats.month] {
            let mut rendered = String::new();
            if write!(rendered, "{}", sample.format(format)).is_err() {
                return Err(LedgerError::Config(format!(
                    "'{format}' is not a valid date format"
                )));
            }
        }
        for directive in ["%Y", "%m", "%d"] {
            if !self.formats.date.contains(directive) {
                return Err(LedgerError::Config(format!(
                    "date format '{}' has no {directive}",
                    self.formats.date
                )));
            }
        }
        if self.formats.month.trim().is_empty() {
            return Err(LedgerError::Config("month format is empty".to_string()));
        }
        if !self.output.monthly_filename.contains("{month}") {
            return Err(LedgerError::Config(format!(
                "monthly filename '{}' has no {{month}} placeholder",
                self.output.monthly_filename
            )));
        }
        if !self.output.annual_filename.contains("{year}") {
            return Err(LedgerError::Config(format!(
                "annual filename '{}' has no {{year}} placeholder",
                self.output.annual_filename
            )));
        }
        if self.source.income_marker.is_empty() {
            return Err(LedgerError::Config("income marker is empty".to_string()));
        }
        Ok(())
    }
}
