//! Normalized ledger records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Whether a ledger line is spending or earning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "支出")]
    Expense,
    #[serde(rename = "收入")]
    Income,
}

impl TransactionType {
    /// Income iff the category is exactly the income marker.
    pub fn classify(category: &str, income_marker: &str) -> Self {
        if category == income_marker {
            TransactionType::Income
        } else {
            TransactionType::Expense
        }
    }

    /// Label written to the transaction-type column of output files.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Expense => "支出",
            TransactionType::Income => "收入",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "支出" => Ok(TransactionType::Expense),
            "收入" => Ok(TransactionType::Income),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

/// One ledger line after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    /// `YYYY-MM` under the default month format
    pub month_key: String,
    pub transaction_type: TransactionType,
    /// Empty when the source cell was blank
    pub category: String,
    /// Empty when the source cell was blank
    pub name: String,
    /// Amount converted to the base currency, rounded per row
    pub amount_base: i64,
    /// Original currency code, display only
    pub currency: String,
    /// Settled amount per participant, in original units
    pub participant_amounts: BTreeMap<String, i64>,
}

impl NormalizedRecord {
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    /// Calendar month number, 1 through 12.
    pub fn month_number(&self) -> u32 {
        self.date.month()
    }

    pub fn settled(&self, participant: &str) -> i64 {
        self.participant_amounts
            .get(participant)
            .copied()
            .unwrap_or(0)
    }
}

/// The full normalized table: the participant schema plus every record in
/// source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLedger {
    /// Sorted participant names discovered from the source header
    pub participants: Vec<String>,
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedLedger {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Year of the first record, used when a report year is not given.
    pub fn first_year(&self) -> Option<i32> {
        self.records.first().map(|r| r.date.year())
    }
}
