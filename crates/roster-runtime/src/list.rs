#![forbid(unsafe_code)]

//! The customer list model.
//!
//! [`CustomerList`] wires the pieces together:
//!
//! - search edits go through a [`Debouncer`] and settle after the quiet
//!   period;
//! - a settled search or a header activation re-derives the view, starts a
//!   new generation and immediately requests the first page;
//! - page fetches complete after the configured latency and are discarded
//!   when their generation is gone;
//! - the renderer reports the last visible row and the list prefetches when
//!   it gets close to the end of the buffer.
//!
//! All timing goes through [`Cmd::schedule`], so a [`Program`] drives the
//! list deterministically.
//!
//! [`Program`]: crate::program::Program

use tracing::{debug, trace, warn};

use roster_core::{ListConfig, Record, RecordSource};
use roster_widgets::{
    Column, DerivedView, FILTER_LABELS, Generation, PageOutcome, PageRequest, PageSource, PageState,
    PaginationController, RowContent, SortKey, SortState, ViewPages, ViewportBridge, derive,
    row_at, row_count,
};

use crate::debounce::{DebounceTicket, Debouncer};
use crate::program::{Cmd, Model, TimerKey};

/// Timer slot for the search debounce.
pub const DEBOUNCE_TIMER: TimerKey = TimerKey("search-debounce");
/// Timer slot for the simulated page fetch.
pub const FETCH_TIMER: TimerKey = TimerKey("page-fetch");

/// Inputs to the customer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMsg {
    /// The search box now holds this raw text.
    SearchInput(String),
    /// The debounce timer for a search edit elapsed.
    SearchSettled(DebounceTicket),
    /// A column header was activated.
    SortBy(SortKey),
    /// The renderer reports the deepest visible row.
    VisibleRange { last_visible: usize },
    /// Scroll the list by a number of rows (positive = down).
    Scroll(i64),
    /// A page fetch finished its round trip.
    PageArrived(PageRequest),
    /// Open or close the filters dropdown.
    ToggleFilters,
}

/// Windowed, searchable, sortable customer list.
pub struct CustomerList<'a, P = ViewPages> {
    source: &'a RecordSource,
    config: ListConfig,
    search: String,
    debouncer: Debouncer<String>,
    sort: SortState,
    view: DerivedView<'a>,
    pagination: PaginationController<'a>,
    viewport: ViewportBridge,
    pages: P,
    filters_open: bool,
}

impl<'a> CustomerList<'a, ViewPages> {
    /// List over `source` with pages sliced straight from the view.
    #[must_use]
    pub fn new(source: &'a RecordSource, config: ListConfig) -> Self {
        Self::with_pages(source, config, ViewPages)
    }
}

impl<'a, P: PageSource<'a>> CustomerList<'a, P> {
    /// List over `source` fetching pages through `pages`.
    #[must_use]
    pub fn with_pages(source: &'a RecordSource, config: ListConfig, pages: P) -> Self {
        Self {
            source,
            debouncer: Debouncer::new(String::new(), config.debounce),
            pagination: PaginationController::new(config.page_size),
            viewport: ViewportBridge::from_config(&config),
            config,
            search: String::new(),
            sort: SortState::unsorted(),
            view: DerivedView::default(),
            pages,
            filters_open: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Raw search text as typed.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Search text the current view was derived from.
    #[must_use]
    pub fn applied_search(&self) -> &str {
        self.debouncer.output()
    }

    #[must_use]
    pub fn sort(&self) -> SortState {
        self.sort
    }

    #[must_use]
    pub fn view(&self) -> &DerivedView<'a> {
        &self.view
    }

    #[must_use]
    pub fn pagination(&self) -> &PaginationController<'a> {
        &self.pagination
    }

    #[must_use]
    pub fn viewport(&self) -> &ViewportBridge {
        &self.viewport
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.pagination.generation()
    }

    /// Loaded rows.
    #[must_use]
    pub fn buffer(&self) -> &[&'a Record] {
        self.pagination.buffer()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pagination.state() == PageState::Loading
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    #[must_use]
    pub fn filters_open(&self) -> bool {
        self.filters_open
    }

    /// Dropdown entries to show; empty while the dropdown is closed.
    #[must_use]
    pub fn filter_labels(&self) -> &'static [&'static str] {
        if self.filters_open { &FILTER_LABELS } else { &[] }
    }

    /// Rows the renderer should lay out, including the loading placeholder.
    #[must_use]
    pub fn row_count(&self) -> usize {
        row_count(&self.pagination)
    }

    #[must_use]
    pub fn row_at(&self, idx: usize) -> RowContent<'a> {
        row_at(&self.pagination, idx)
    }

    /// Rows inside the render window (visible rows plus overscan).
    #[must_use]
    pub fn render_rows(&self) -> Vec<(usize, RowContent<'a>)> {
        self.viewport.render_rows(&self.pagination)
    }

    /// Header labels with the sort indicator applied.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        Column::ALL.iter().map(|c| c.header(self.sort)).collect()
    }

    /// Rebuild the view from the applied search and sort, start a new
    /// generation and request its first page.
    fn rederive(&mut self) -> Cmd<ListMsg> {
        self.view = derive(self.source, self.debouncer.output(), self.sort);
        let generation = self.pagination.reset();
        self.viewport.scroll_to_top();
        debug!(
            generation = generation.0,
            rows = self.view.len(),
            search = %self.debouncer.output(),
            sort_key = ?self.sort.key,
            "view re-derived"
        );
        let first = self.pagination.begin_load();
        // Drop the previous generation's fetch timer.
        Cmd::batch(vec![Cmd::cancel(FETCH_TIMER), self.fetch(first)])
    }

    fn fetch(&self, request: Option<PageRequest>) -> Cmd<ListMsg> {
        match request {
            Some(request) => {
                trace!(
                    generation = request.generation.0,
                    page_index = request.page_index,
                    "page fetch scheduled"
                );
                Cmd::schedule(
                    FETCH_TIMER,
                    self.config.fetch_latency,
                    ListMsg::PageArrived(request),
                )
            }
            None => Cmd::none(),
        }
    }

    fn visible(&mut self, last_visible: usize) -> Cmd<ListMsg> {
        let request = self
            .viewport
            .on_visible_range_changed(last_visible, &mut self.pagination);
        self.fetch(request)
    }

    fn page_arrived(&mut self, request: PageRequest) -> Cmd<ListMsg> {
        match self.pagination.resolve(&request, &self.view, &self.pages) {
            PageOutcome::Appended {
                page_index,
                rows,
                has_more,
            } => {
                debug!(
                    generation = request.generation.0,
                    page_index, rows, has_more, "page appended"
                );
            }
            PageOutcome::Stale => {
                debug!(
                    generation = request.generation.0,
                    current = self.pagination.generation().0,
                    "stale page discarded"
                );
            }
            PageOutcome::Failed(err) => {
                warn!(page_index = request.page_index, error = %err, "page fetch failed");
            }
        }
        Cmd::none()
    }
}

impl<'a, P: PageSource<'a>> Model for CustomerList<'a, P> {
    type Message = ListMsg;

    fn init(&mut self) -> Cmd<ListMsg> {
        self.rederive()
    }

    fn update(&mut self, msg: ListMsg) -> Cmd<ListMsg> {
        match msg {
            ListMsg::SearchInput(text) => {
                self.search = text.clone();
                let ticket = self.debouncer.input(text);
                Cmd::schedule(
                    DEBOUNCE_TIMER,
                    self.debouncer.delay(),
                    ListMsg::SearchSettled(ticket),
                )
            }
            ListMsg::SearchSettled(ticket) => match self.debouncer.fire(ticket) {
                Some(_) => self.rederive(),
                None => Cmd::none(),
            },
            ListMsg::SortBy(key) => {
                self.sort = self.sort.toggled(key);
                self.rederive()
            }
            ListMsg::VisibleRange { last_visible } => self.visible(last_visible),
            ListMsg::Scroll(delta) => {
                let total = self.row_count();
                self.viewport.scroll(delta, total);
                match self.viewport.last_visible_index(total) {
                    Some(last_visible) => self.visible(last_visible),
                    None => Cmd::none(),
                }
            }
            ListMsg::PageArrived(request) => self.page_arrived(request),
            ListMsg::ToggleFilters => {
                self.filters_open = !self.filters_open;
                Cmd::none()
            }
        }
    }

    fn teardown(&mut self) {
        self.debouncer.cancel();
    }
}
