#![forbid(unsafe_code)]

//! Incremental pagination of a [`DerivedView`].
//!
//! [`PaginationController`] owns the rows loaded so far for one view
//! generation and hands out at most one [`PageRequest`] at a time.
//!
//! # State machine
//!
//! ```text
//!            begin_load                 complete(Ok, more)
//!   Idle ───────────────▶ Loading ─────────────────────────▶ Idle
//!    ▲                       │  complete(Ok, no more)
//!    │ reset                 └─────────────────────────────▶ Exhausted
//!    └──────────── (any state)       complete(Err) ─▶ Idle + last_error
//! ```
//!
//! # Invariants
//!
//! - After each successful load, `buffer.len() == min(next_page * page_size, view.len())`
//!   and `has_more == (buffer.len() < view.len())`.
//! - Pages are appended in increasing `page_index` order within a generation.
//! - A request from an earlier generation is discarded when it resolves; it
//!   never reaches the buffer.

use std::fmt;
use std::ops::Range;

use roster_core::Record;

use crate::query::DerivedView;

/// Logical identity of one derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// One page fetch, tied to the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub generation: Generation,
    pub page_index: usize,
    /// `[page_index * page_size, page_index * page_size + page_size)`, unclamped.
    pub range: Range<usize>,
}

/// Page fetch failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend refused or failed the request.
    Backend(String),
    /// The backend did not answer in time.
    Timeout,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "page fetch failed: {msg}"),
            Self::Timeout => write!(f, "page fetch timed out"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Where page contents come from.
///
/// One call fetches one page. The in-memory default slices the view; a
/// backend implementation may fail, in which case the page can be requested
/// again.
pub trait PageSource<'a> {
    fn fetch_page(
        &self,
        view: &DerivedView<'a>,
        request: &PageRequest,
    ) -> Result<Vec<&'a Record>, FetchError>;
}

/// Slices pages straight out of the derived view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewPages;

impl<'a> PageSource<'a> for ViewPages {
    fn fetch_page(
        &self,
        view: &DerivedView<'a>,
        request: &PageRequest,
    ) -> Result<Vec<&'a Record>, FetchError> {
        Ok(view.slice(request.range.clone()).to_vec())
    }
}

/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// More rows are available and no load is in flight.
    Idle,
    /// A page request is in flight.
    Loading,
    /// Every row of the view is in the buffer.
    Exhausted,
}

/// Result of resolving a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Rows were appended.
    Appended { page_index: usize, rows: usize, has_more: bool },
    /// The request does not belong to the current generation or is not the
    /// one in flight; nothing changed.
    Stale,
    /// The fetch failed; the controller is idle again with `last_error` set.
    Failed(FetchError),
}

/// Buffer, cursor and flags for one view generation.
#[derive(Debug, Clone)]
pub struct PaginationController<'a> {
    page_size: usize,
    buffer: Vec<&'a Record>,
    next_page: usize,
    in_flight: Option<PageRequest>,
    has_more: bool,
    generation: Generation,
    last_error: Option<FetchError>,
}

impl<'a> PaginationController<'a> {
    /// New controller at generation 0. A page size of 0 is treated as 1.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            buffer: Vec::new(),
            next_page: 0,
            in_flight: None,
            has_more: true,
            generation: Generation::default(),
            last_error: None,
        }
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rows loaded so far.
    #[must_use]
    pub fn buffer(&self) -> &[&'a Record] {
        &self.buffer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&'a Record> {
        self.buffer.get(idx).copied()
    }

    /// Index of the next page to load.
    #[must_use]
    pub fn next_page_index(&self) -> usize {
        self.next_page
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The request currently in flight, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<&PageRequest> {
        self.in_flight.as_ref()
    }

    /// Error from the most recent failed fetch; cleared by a successful load
    /// or a reset.
    #[must_use]
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        if self.in_flight.is_some() {
            PageState::Loading
        } else if self.has_more {
            PageState::Idle
        } else {
            PageState::Exhausted
        }
    }

    /// Start loading the next page.
    ///
    /// Returns `None` (and changes nothing) while a load is in flight or when
    /// the view is exhausted.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more {
            return None;
        }
        let start = self.next_page * self.page_size;
        let request = PageRequest {
            generation: self.generation,
            page_index: self.next_page,
            range: start..start + self.page_size,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            generation = self.generation.0,
            page_index = request.page_index,
            "page load started"
        );
        self.in_flight = Some(request.clone());
        Some(request)
    }

    /// Whether `request` is the one this controller is waiting for.
    #[must_use]
    pub fn is_pending(&self, request: &PageRequest) -> bool {
        self.in_flight.as_ref() == Some(request)
    }

    /// Apply the result of `request` against a view of `view_len` rows.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<Vec<&'a Record>, FetchError>,
        view_len: usize,
    ) -> PageOutcome {
        if !self.is_pending(request) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                request_generation = request.generation.0,
                current_generation = self.generation.0,
                page_index = request.page_index,
                "page result is not pending"
            );
            return PageOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(rows) => {
                let appended = rows.len();
                self.buffer.extend(rows);
                self.next_page += 1;
                self.has_more = request.range.end < view_len;
                self.last_error = None;
                PageOutcome::Appended {
                    page_index: request.page_index,
                    rows: appended,
                    has_more: self.has_more,
                }
            }
            Err(err) => {
                self.has_more = true;
                self.last_error = Some(err.clone());
                PageOutcome::Failed(err)
            }
        }
    }

    /// Fetch `request` from `pages` and apply it, unless it is stale.
    pub fn resolve<S>(
        &mut self,
        request: &PageRequest,
        view: &DerivedView<'a>,
        pages: &S,
    ) -> PageOutcome
    where
        S: PageSource<'a> + ?Sized,
    {
        if !self.is_pending(request) {
            return self.complete(request, Ok(Vec::new()), view.len());
        }
        let result = pages.fetch_page(view, request);
        self.complete(request, result, view.len())
    }

    /// Drop everything and move to a new generation.
    ///
    /// Any request still in flight is forgotten and will resolve as
    /// [`PageOutcome::Stale`].
    pub fn reset(&mut self) -> Generation {
        self.buffer.clear();
        self.next_page = 0;
        self.in_flight = None;
        self.has_more = true;
        self.last_error = None;
        self.generation = self.generation.next();
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{AvatarRef, RecordId, RecordSource};
    use time::macros::datetime;

    fn source(n: usize) -> RecordSource {
        (0..n)
            .map(|i| Record {
                id: RecordId(i as u64 + 1),
                name: format!("Person {i}"),
                phone: "555-0100".to_string(),
                email: format!("p{i}@x.io"),
                score: (i % 101) as u8,
                last_message_at: datetime!(2024-01-01 0:00 UTC),
                added_by: "Ops".to_string(),
                avatar: AvatarRef::for_name("Person"),
            })
            .collect()
    }

    fn view(src: &RecordSource) -> DerivedView<'_> {
        DerivedView::from_rows(src.records().iter().collect())
    }

    fn load<'a>(ctl: &mut PaginationController<'a>, view: &DerivedView<'a>) -> PageOutcome {
        let request = ctl.begin_load().expect("load should start");
        ctl.resolve(&request, view, &ViewPages)
    }

    #[test]
    fn starts_idle_and_empty() {
        let ctl = PaginationController::new(30);
        assert_eq!(ctl.state(), PageState::Idle);
        assert!(ctl.is_empty());
        assert_eq!(ctl.next_page_index(), 0);
        assert!(ctl.has_more());
        assert!(!ctl.is_loading());
    }

    #[test]
    fn pages_append_in_order() {
        let src = source(75);
        let v = view(&src);
        let mut ctl = PaginationController::new(30);

        assert_eq!(
            load(&mut ctl, &v),
            PageOutcome::Appended { page_index: 0, rows: 30, has_more: true }
        );
        assert_eq!(
            load(&mut ctl, &v),
            PageOutcome::Appended { page_index: 1, rows: 30, has_more: true }
        );
        assert_eq!(
            load(&mut ctl, &v),
            PageOutcome::Appended { page_index: 2, rows: 15, has_more: false }
        );
        assert_eq!(ctl.len(), 75);
        assert_eq!(ctl.state(), PageState::Exhausted);
        for (i, record) in ctl.buffer().iter().enumerate() {
            assert_eq!(record.id, RecordId(i as u64 + 1));
        }
    }

    #[test]
    fn exact_multiple_is_exhausted_after_last_full_page() {
        let src = source(60);
        let v = view(&src);
        let mut ctl = PaginationController::new(30);
        load(&mut ctl, &v);
        assert!(ctl.has_more());
        load(&mut ctl, &v);
        assert!(!ctl.has_more());
        assert_eq!(ctl.begin_load(), None);
    }

    #[test]
    fn empty_view_exhausts_on_first_load() {
        let src = source(0);
        let v = view(&src);
        let mut ctl = PaginationController::new(30);
        assert_eq!(
            load(&mut ctl, &v),
            PageOutcome::Appended { page_index: 0, rows: 0, has_more: false }
        );
        assert_eq!(ctl.state(), PageState::Exhausted);
    }

    #[test]
    fn begin_load_is_guarded_while_loading() {
        let mut ctl = PaginationController::new(30);
        let first = ctl.begin_load();
        assert!(first.is_some());
        assert_eq!(ctl.state(), PageState::Loading);
        assert_eq!(ctl.begin_load(), None);
        assert_eq!(ctl.in_flight(), first.as_ref());
    }

    #[test]
    fn reset_restores_initial_state_and_bumps_generation() {
        let src = source(100);
        let v = view(&src);
        let mut ctl = PaginationController::new(30);
        load(&mut ctl, &v);
        load(&mut ctl, &v);
        let before = ctl.generation();

        let generation = ctl.reset();
        assert_eq!(generation, before.next());
        assert!(ctl.is_empty());
        assert_eq!(ctl.next_page_index(), 0);
        assert!(ctl.has_more());
        assert!(!ctl.is_loading());
    }

    #[test]
    fn stale_generation_is_discarded() {
        let src = source(100);
        let old_view = view(&src);
        let new_view = DerivedView::from_rows(src.records().iter().rev().collect());
        let mut ctl = PaginationController::new(30);

        let stale = ctl.begin_load().unwrap();
        ctl.reset();
        let fresh = ctl.begin_load().unwrap();
        assert_eq!(fresh.page_index, 0);
        assert_ne!(fresh.generation, stale.generation);

        assert_eq!(ctl.resolve(&stale, &old_view, &ViewPages), PageOutcome::Stale);
        assert!(ctl.is_empty());
        assert!(ctl.is_loading());

        load_resolved(&mut ctl, &fresh, &new_view);
        assert_eq!(ctl.len(), 30);
        assert_eq!(ctl.get(0).map(|r| r.id), Some(RecordId(100)));
    }

    fn load_resolved<'a>(
        ctl: &mut PaginationController<'a>,
        request: &PageRequest,
        view: &DerivedView<'a>,
    ) {
        assert!(matches!(
            ctl.resolve(request, view, &ViewPages),
            PageOutcome::Appended { .. }
        ));
    }

    #[test]
    fn stale_result_after_reset_without_new_load_is_discarded() {
        let src = source(10);
        let v = view(&src);
        let mut ctl = PaginationController::new(30);
        let stale = ctl.begin_load().unwrap();
        ctl.reset();
        assert_eq!(ctl.complete(&stale, Ok(v.rows().to_vec()), v.len()), PageOutcome::Stale);
        assert!(ctl.is_empty());
        assert_eq!(ctl.state(), PageState::Idle);
    }

    struct Failing;

    impl<'a> PageSource<'a> for Failing {
        fn fetch_page(
            &self,
            _view: &DerivedView<'a>,
            _request: &PageRequest,
        ) -> Result<Vec<&'a Record>, FetchError> {
            Err(FetchError::Backend("503".to_string()))
        }
    }

    #[test]
    fn failed_fetch_returns_to_idle_with_error() {
        let src = source(50);
        let v = view(&src);
        let mut ctl = PaginationController::new(30);
        let request = ctl.begin_load().unwrap();
        let outcome = ctl.resolve(&request, &v, &Failing);
        assert_eq!(outcome, PageOutcome::Failed(FetchError::Backend("503".to_string())));
        assert_eq!(ctl.state(), PageState::Idle);
        assert!(ctl.last_error().is_some());
        assert!(ctl.is_empty());

        // The same page is requested again and the error clears on success.
        let retry = ctl.begin_load().unwrap();
        assert_eq!(retry.page_index, 0);
        ctl.resolve(&retry, &v, &ViewPages);
        assert_eq!(ctl.len(), 30);
        assert!(ctl.last_error().is_none());
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(PaginationController::new(0).page_size(), 1);
    }

    #[test]
    fn fetch_error_display() {
        assert_eq!(FetchError::Timeout.to_string(), "page fetch timed out");
        assert_eq!(Generation(3).to_string(), "g3");
    }
}
