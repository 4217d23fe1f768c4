#![forbid(unsafe_code)]

//! View derivation, pagination and viewport logic for the customer list.

pub mod pagination;
pub mod query;
pub mod sort;
pub mod viewport;

pub use pagination::{
    FetchError, Generation, PageOutcome, PageRequest, PageSource, PageState,
    PaginationController, ViewPages,
};
pub use query::{DerivedView, SearchTerm, derive};
pub use sort::{Column, SortDirection, SortKey, SortState};
pub use viewport::{RowContent, ViewportBridge, row_at, row_count};

/// Static labels of the filters dropdown.
pub const FILTER_LABELS: [&str; 4] = ["Filter 1", "Filter 2", "Filter 3", "Filter 4"];
