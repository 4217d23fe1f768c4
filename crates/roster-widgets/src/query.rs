#![forbid(unsafe_code)]

//! Query engine: search filter plus stable sort over a [`RecordSource`].
//!
//! [`derive`] is a pure function of its inputs. It never touches the source;
//! the resulting [`DerivedView`] only holds references into it.
//!
//! # Matching
//!
//! A non-blank term is lowercased once. A record matches when the term is a
//! substring of its lowercased name, its lowercased email, or its phone
//! number exactly as stored. A blank term (empty or whitespace only) keeps
//! every record.
//!
//! # Ordering
//!
//! With a sort key set, records are ordered with `slice::sort_by`, which is
//! stable: equal keys keep their relative source order, and sorting an
//! already-sorted view is a no-op.

use std::cmp::Ordering;
use std::ops::{Index, Range};

use roster_core::{Record, RecordSource, SearchKeys};

use crate::sort::SortState;

/// A prepared, lowercased search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    lowered: String,
}

impl SearchTerm {
    /// Prepare `raw` for matching; `None` when it is blank.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self {
            lowered: raw.to_lowercase(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.lowered
    }

    /// Match against precomputed search keys.
    #[must_use]
    pub fn matches(&self, record: &Record, keys: &SearchKeys) -> bool {
        keys.name.contains(&self.lowered)
            || keys.email.contains(&self.lowered)
            || record.phone.contains(&self.lowered)
    }
}

/// Filtered and ordered projection of a [`RecordSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> DerivedView<'a> {
    /// View over `rows` as given.
    #[must_use]
    pub fn from_rows(rows: Vec<&'a Record>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&'a Record> {
        self.rows.get(idx).copied()
    }

    /// Rows in `range`, clamped to the view.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &[&'a Record] {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        &self.rows[start..end]
    }

    #[must_use]
    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows.iter().copied()
    }
}

impl<'a> Index<usize> for DerivedView<'a> {
    type Output = Record;

    fn index(&self, idx: usize) -> &Record {
        self.rows[idx]
    }
}

/// Apply `term` and `sort` to `source`.
#[must_use]
pub fn derive<'a>(source: &'a RecordSource, term: &str, sort: SortState) -> DerivedView<'a> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "derive_view",
        source_len = source.len(),
        term_len = term.len(),
        sort_key = ?sort.key
    )
    .entered();

    let mut rows: Vec<&'a Record> = match SearchTerm::new(term) {
        Some(term) => source
            .iter_keyed()
            .filter(|(record, keys)| term.matches(record, keys))
            .map(|(record, _)| record)
            .collect(),
        None => source.records().iter().collect(),
    };

    if sort.key.is_some() {
        rows.sort_by(|a, b| sort.compare(a, b).unwrap_or(Ordering::Equal));
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(rows = rows.len(), "view derived");

    DerivedView { rows }
}
