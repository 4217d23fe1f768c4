#![forbid(unsafe_code)]

//! Bridge between a fixed-row-height virtualized list and pagination.
//!
//! The renderer reports the last visible row index; the bridge decides
//! whether the next page should be loaded and materializes rows (including
//! the trailing loading placeholder) for the window being drawn.

use std::ops::Range;

use roster_core::{ListConfig, Record};

use crate::pagination::{PageRequest, PaginationController};

/// What to draw at a row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowContent<'a> {
    Record(&'a Record),
    /// "Loading more..." row at index `buffer.len()` while more rows exist.
    Placeholder,
    /// Nothing to draw: out of range, or the record has no name.
    Empty,
}

/// Total rows the list should report for `pagination`.
///
/// One extra row holds the loading placeholder while more data exists.
#[must_use]
pub fn row_count(pagination: &PaginationController<'_>) -> usize {
    let len = pagination.len();
    if pagination.has_more() { len + 1 } else { len }
}

/// Row content at `idx`. Never panics.
#[must_use]
pub fn row_at<'a>(pagination: &PaginationController<'a>, idx: usize) -> RowContent<'a> {
    match pagination.get(idx) {
        Some(record) if record.is_renderable() => RowContent::Record(record),
        Some(_) => RowContent::Empty,
        None if idx == pagination.len() && pagination.has_more() => RowContent::Placeholder,
        None => RowContent::Empty,
    }
}

/// Scroll window and prefetch trigger for the customer list.
#[derive(Debug, Clone)]
pub struct ViewportBridge {
    scroll_offset: usize,
    visible_count: usize,
    overscan: usize,
    prefetch_margin: usize,
}

impl Default for ViewportBridge {
    fn default() -> Self {
        Self::from_config(&ListConfig::default())
    }
}

impl ViewportBridge {
    #[must_use]
    pub fn new(visible_count: usize, prefetch_margin: usize) -> Self {
        Self {
            scroll_offset: 0,
            visible_count,
            overscan: 2,
            prefetch_margin,
        }
    }

    /// Geometry and margin taken from `config`.
    #[must_use]
    pub fn from_config(config: &ListConfig) -> Self {
        Self::new(config.visible_rows(), config.prefetch_margin).with_overscan(config.overscan)
    }

    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    #[must_use]
    pub fn prefetch_margin(&self) -> usize {
        self.prefetch_margin
    }

    /// Scroll by `delta` rows (positive = down), clamped to `total_rows`.
    pub fn scroll(&mut self, delta: i64, total_rows: usize) {
        if total_rows == 0 {
            self.scroll_offset = 0;
            return;
        }
        let max_offset = if self.visible_count > 0 {
            total_rows.saturating_sub(self.visible_count)
        } else {
            total_rows.saturating_sub(1)
        };
        let offset = (self.scroll_offset as i64)
            .saturating_add(delta)
            .clamp(0, max_offset as i64);
        self.scroll_offset = offset as usize;
    }

    pub fn scroll_to(&mut self, idx: usize, total_rows: usize) {
        self.scroll_offset = idx.min(total_rows.saturating_sub(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    /// Rows currently inside the viewport.
    #[must_use]
    pub fn visible_range(&self, total_rows: usize) -> Range<usize> {
        let start = self.scroll_offset.min(total_rows);
        let end = start.saturating_add(self.visible_count).min(total_rows);
        start..end
    }

    /// Visible rows plus overscan on both sides.
    #[must_use]
    pub fn render_range(&self, total_rows: usize) -> Range<usize> {
        let visible = self.visible_range(total_rows);
        let start = visible.start.saturating_sub(self.overscan);
        let end = visible.end.saturating_add(self.overscan).min(total_rows);
        start..end
    }

    /// Index of the last visible row, if any row is visible.
    #[must_use]
    pub fn last_visible_index(&self, total_rows: usize) -> Option<usize> {
        let visible = self.visible_range(total_rows);
        if visible.is_empty() {
            None
        } else {
            Some(visible.end - 1)
        }
    }

    /// Whether a visible index this deep should pull the next page.
    #[must_use]
    pub fn wants_more(&self, last_visible: usize, pagination: &PaginationController<'_>) -> bool {
        last_visible.saturating_add(self.prefetch_margin) >= pagination.len()
            && pagination.has_more()
            && !pagination.is_loading()
    }

    /// React to the renderer reporting `last_visible` as the deepest visible
    /// row. Returns the page request when a load was started.
    pub fn on_visible_range_changed<'a>(
        &self,
        last_visible: usize,
        pagination: &mut PaginationController<'a>,
    ) -> Option<PageRequest> {
        if !self.wants_more(last_visible, pagination) {
            return None;
        }
        let request = pagination.begin_load()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            last_visible,
            buffered = pagination.len(),
            page_index = request.page_index,
            "prefetch triggered"
        );
        Some(request)
    }

    /// Materialize the render window.
    #[must_use]
    pub fn render_rows<'a>(
        &self,
        pagination: &PaginationController<'a>,
    ) -> Vec<(usize, RowContent<'a>)> {
        self.render_range(row_count(pagination))
            .map(|idx| (idx, row_at(pagination, idx)))
            .collect()
    }
}
