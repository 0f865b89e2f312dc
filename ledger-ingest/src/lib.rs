//! ledger-ingest: reads the household ledger CSV, normalizes its rows and
//! groups them by month.

pub mod coerce;
pub mod dates;
pub mod group;
pub mod normalize;
pub mod processed;
pub mod schema;
pub mod source;

pub use group::{MonthlyGroup, group_by_month};
pub use normalize::{Normalizer, load_and_normalize};
pub use processed::{read_processed, write_bom_csv, write_monthly_files, write_processed};
pub use schema::{LedgerSchema, discover_participants};
pub use source::{RawRow, RawTable, read_source};
