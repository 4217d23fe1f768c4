#![forbid(unsafe_code)]

//! Read-only record source.
//!
//! A [`RecordSource`] is built once at startup and then only borrowed. It
//! keeps the records in their original order together with lowercased
//! search keys for the case-insensitive filter, so a query never has to
//! re-fold a million names.

use std::ops::Index;

use crate::record::Record;

/// Lowercased haystacks for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKeys {
    pub name: String,
    pub email: String,
}

impl SearchKeys {
    fn for_record(record: &Record) -> Self {
        Self {
            name: record.name.to_lowercase(),
            email: record.email.to_lowercase(),
        }
    }
}

/// Immutable, ordered record set.
#[derive(Debug, Clone, Default)]
pub struct RecordSource {
    records: Vec<Record>,
    keys: Vec<SearchKeys>,
}

impl RecordSource {
    /// Take ownership of `records`, preserving their order.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        let keys = records.iter().map(SearchKeys::for_record).collect();
        Self { records, keys }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records paired with their search keys, in source order.
    pub fn iter_keyed(&self) -> impl Iterator<Item = (&Record, &SearchKeys)> + '_ {
        self.records.iter().zip(self.keys.iter())
    }
}

impl Index<usize> for RecordSource {
    type Output = Record;

    fn index(&self, idx: usize) -> &Record {
        &self.records[idx]
    }
}

impl From<Vec<Record>> for RecordSource {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for RecordSource {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
