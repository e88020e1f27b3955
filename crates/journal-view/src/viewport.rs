#![forbid(unsafe_code)]

//! Viewport state and backward windowing over history.
//!
//! The scroll offset is measured in display lines up from the newest
//! record. Offset `0` shows the freshest content; [`ViewportState::scroll_up`]
//! moves toward older records.
//!
//! [`ViewportWindower::select`] walks records newest to oldest, summing
//! their spans, and stops as soon as `[offset, offset + available_lines)`
//! is covered. Records older than the window are never measured.
//!
//! # Example
//! ```
//! use journal_view::span::SpanCache;
//! use journal_view::viewport::{ViewportState, ViewportWindower};
//!
//! let lines: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
//! let mut state = ViewportState::default();
//! let mut cache = SpanCache::new(64);
//!
//! let window = ViewportWindower::new(80, 4).select(&lines, &mut state, &mut cache);
//! assert_eq!(window.range, 6..10);
//! ```

use std::ops::Range;

use journal_core::DisplayOrder;
use journal_filter::HistoryStore;

use crate::span::SpanCache;

/// Anything the windower can walk: oldest-first plain texts.
pub trait WindowSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plain text of record `index` (0 = oldest).
    fn plain(&self, index: usize) -> &str;
}

impl WindowSource for HistoryStore {
    fn len(&self) -> usize {
        HistoryStore::len(self)
    }

    fn plain(&self, index: usize) -> &str {
        self.get(index).map_or("", |r| r.plain.as_str())
    }
}

impl WindowSource for [String] {
    fn len(&self) -> usize {
        <[String]>::len(self)
    }

    fn plain(&self, index: usize) -> &str {
        self.get(index).map_or("", String::as_str)
    }
}

impl WindowSource for Vec<String> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn plain(&self, index: usize) -> &str {
        self.as_slice().plain(index)
    }
}

/// Scroll position, owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    /// Lines scrolled up from the newest record.
    pub scroll_offset_lines: usize,
    /// Track the newest content; reset to offset 0 on every window.
    pub stick_to_bottom: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scroll_offset_lines: 0,
            stick_to_bottom: true,
        }
    }
}

impl ViewportState {
    /// Scroll toward older records. Leaves stick-to-bottom.
    pub fn scroll_up(&mut self, lines: usize) {
        if lines == 0 {
            return;
        }
        self.scroll_offset_lines = self.scroll_offset_lines.saturating_add(lines);
        self.stick_to_bottom = false;
    }

    /// Scroll toward newer records. Reaching the bottom re-enters stick mode.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset_lines = self.scroll_offset_lines.saturating_sub(lines);
        if self.scroll_offset_lines == 0 {
            self.stick_to_bottom = true;
        }
    }

    pub fn page_up(&mut self, page_lines: usize) {
        self.scroll_up(page_lines.max(1));
    }

    pub fn page_down(&mut self, page_lines: usize) {
        self.scroll_down(page_lines.max(1));
    }

    pub fn scroll_to_bottom(&mut self) {
        *self = Self::default();
    }
}

/// The slice of history selected for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Window {
    /// Oldest-first record indices, possibly partially visible at either edge.
    pub range: Range<usize>,
    /// Scroll offset actually used (after stick-to-bottom and clamping).
    pub offset_lines: usize,
    /// Lines from the bottom through the oldest selected record.
    pub covered_lines: usize,
}

impl Window {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Indices in on-screen order.
    #[must_use]
    pub fn indices(&self, order: DisplayOrder) -> Vec<usize> {
        match order {
            DisplayOrder::OldestFirst => self.range.clone().collect(),
            DisplayOrder::NewestFirst => self.range.clone().rev().collect(),
        }
    }
}

/// Selects the records that cover the visible line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportWindower {
    width: usize,
    available_lines: usize,
}

impl ViewportWindower {
    #[must_use]
    pub const fn new(width: usize, available_lines: usize) -> Self {
        Self {
            width,
            available_lines,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn available_lines(&self) -> usize {
        self.available_lines
    }

    /// Select the window for `state`, resetting or clamping its offset.
    ///
    /// If the offset scrolls past the oldest record, it is clamped so the
    /// oldest page is shown.
    pub fn select<S>(&self, source: &S, state: &mut ViewportState, cache: &mut SpanCache) -> Window
    where
        S: WindowSource + ?Sized,
    {
        if state.stick_to_bottom {
            state.scroll_offset_lines = 0;
        }
        if source.is_empty() || self.available_lines == 0 {
            return Window {
                range: 0..0,
                offset_lines: state.scroll_offset_lines,
                covered_lines: 0,
            };
        }

        let window = self.walk(source, state.scroll_offset_lines, cache);
        if !window.is_empty() {
            return window;
        }

        // Scrolled past the oldest record: `covered_lines` is the total.
        let clamped = window.covered_lines.saturating_sub(self.available_lines);
        state.scroll_offset_lines = clamped;
        self.walk(source, clamped, cache)
    }

    fn walk<S>(&self, source: &S, offset: usize, cache: &mut SpanCache) -> Window
    where
        S: WindowSource + ?Sized,
    {
        let len = source.len();
        let target = offset.saturating_add(self.available_lines);
        let mut covered = 0usize;
        let mut start = len;
        let mut end = len;

        for index in (0..len).rev() {
            let span = cache.span(source.plain(index), self.width).max(1);
            covered += span;
            if covered <= offset {
                // Entirely below the visible range.
                end = index;
                continue;
            }
            start = index;
            if covered >= target {
                break;
            }
        }

        if start == len {
            return Window {
                range: 0..0,
                offset_lines: offset,
                covered_lines: covered,
            };
        }
        Window {
            range: start..end,
            offset_lines: offset,
            covered_lines: covered,
        }
    }
}
