//! ledger-core: record types, configuration and errors shared by the ledger pipeline

pub mod cell;
pub mod config;
pub mod error;
pub mod record;

pub use cell::Cell;
pub use config::{
    ColumnNames, CurrencySection, FormatSection, LedgerConfig, OutputSection, ReportLabels,
    SheetsSection, SourceSection,
};
pub use error::{LedgerError, Result};
pub use record::{NormalizedLedger, NormalizedRecord, TransactionType};

/// Abbreviated English month names used as report columns, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan.", "Feb.", "Mar.", "Apr.", "May", "Jun.", "Jul.", "Aug.", "Sep.", "Oct.", "Nov.", "Dec.",
];
