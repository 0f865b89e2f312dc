//! Header scan: locates the required columns and builds the participant
//! schema before any row is processed.
//!
//! Per-person columns look like `Alice(paid)` or `Bob (share)`. The part
//! before the parenthesis names the participant; one participant may own
//! several columns.

use ledger_core::{ColumnNames, LedgerError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PAREN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*\)").expect("static regex"));

fn is_person_column(header: &str) -> bool {
    header.contains('(') && header.contains(')')
}

/// Participant name of a per-person column header.
pub fn participant_name(header: &str) -> String {
    PAREN_SUFFIX.replace_all(header, "").into_owned()
}

/// Sorted, de-duplicated participant names found in `headers`.
pub fn discover_participants<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers
        .iter()
        .map(AsRef::as_ref)
        .filter(|h| is_person_column(h))
        .map(participant_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantColumns {
    pub name: String,
    /// Indices of every source column owned by this participant
    pub columns: Vec<usize>,
}

/// Column positions resolved against one source header.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSchema {
    pub date: usize,
    pub category: usize,
    pub name: usize,
    pub amount: usize,
    pub currency: usize,
    pub exchange_rate: usize,
    /// Sorted by participant name
    pub participants: Vec<ParticipantColumns>,
}

impl LedgerSchema {
    pub fn resolve(headers: &[String], columns: &ColumnNames) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h == wanted)
                .ok_or_else(|| LedgerError::MissingColumn {
                    column: wanted.to_string(),
                })
        };

        let participants = discover_participants(headers)
            .into_iter()
            .map(|name| {
                let columns = headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| is_person_column(h) && participant_name(h) == name)
                    .map(|(i, _)| i)
                    .collect();
                ParticipantColumns { name, columns }
            })
            .collect();

        Ok(LedgerSchema {
            date: find(&columns.date)?,
            category: find(&columns.category)?,
            name: find(&columns.name)?,
            amount: find(&columns.amount)?,
            currency: find(&columns.currency)?,
            exchange_rate: find(&columns.exchange_rate)?,
            participants,
        })
    }

    pub fn participant_names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }
}
