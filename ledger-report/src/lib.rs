//! ledger-report: annual pivot report, display formatting, and publishing to
//! a spreadsheet sink.

pub mod annual;
pub mod format;
pub mod publish;

pub use annual::{AnnualReport, MonthlySummary, PivotRow, PivotTable, write_annual_report};
pub use format::{format_amount, monthly_upload_rows, to_json_rows};
pub use publish::{PublishSummary, SheetSink, publish};
