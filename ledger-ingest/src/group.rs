//! Partition normalized records by month key.

use ledger_core::NormalizedRecord;
use std::collections::HashMap;

/// Records sharing one month key, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyGroup<'a> {
    pub month_key: &'a str,
    pub records: Vec<&'a NormalizedRecord>,
}

impl MonthlyGroup<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Groups in first-seen order of their month key.
pub fn group_by_month(records: &[NormalizedRecord]) -> Vec<MonthlyGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<MonthlyGroup<'_>> = Vec::new();

    for record in records {
        let slot = *index.entry(record.month_key.as_str()).or_insert_with(|| {
            groups.push(MonthlyGroup {
                month_key: record.month_key.as_str(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups
}
