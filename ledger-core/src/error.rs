//! Error taxonomy for the ledger pipeline.
//!
//! Every variant is fatal to the run. Bad numeric cells are not represented
//! here: they coerce to zero during normalization.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("cannot read source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source is missing required column '{column}'")]
    MissingColumn { column: String },

    /// `row` is the 1-based line number in the source file (header is line 1).
    #[error("line {row}: cannot parse date '{value}' with format '{format}'")]
    DateParse {
        row: usize,
        value: String,
        format: String,
    },

    #[error("line {row}: {message}")]
    Malformed { row: usize, message: String },

    #[error("ledger has no records and no report year was given")]
    EmptyLedger,

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("writing tab '{tab}' failed: {message}")]
    SinkWrite { tab: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    pub fn sink_write(tab: &str, message: impl ToString) -> Self {
        LedgerError::SinkWrite {
            tab: tab.to_string(),
            message: message.to_string(),
        }
    }
}
