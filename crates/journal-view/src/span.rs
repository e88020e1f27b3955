#![forbid(unsafe_code)]

//! Wrapped-line span estimation with memoization.
//!
//! [`estimate_span`] greedily word-wraps text at a column width using
//! `unicode-width` cell widths. It is an estimate of what the sink will do,
//! not a measurement: it only needs to be consistent and monotonic (more
//! text never yields fewer lines).
//!
//! [`SpanCache`] memoizes `(content_hash, width) -> span`. When full it is
//! cleared outright; the log view's working set is small and stable, so
//! per-entry recency tracking would cost more than the occasional rebuild.
//!
//! # Example
//! ```
//! use journal_view::span::{SpanCache, estimate_span};
//!
//! assert_eq!(estimate_span("hello world", 5), 2);
//!
//! let mut cache = SpanCache::new(64);
//! assert_eq!(cache.span("hello world", 5), 2);
//! assert_eq!(cache.span("hello world", 5), 2);
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use tracing::trace;
use unicode_width::UnicodeWidthStr;

/// Default cache capacity.
pub const DEFAULT_SPAN_CACHE_CAPACITY: usize = 2048;

/// Number of display lines `text` occupies at `width` columns.
///
/// Every paragraph (newline-separated) takes at least one line. Words wider
/// than the width are broken across lines. A width of zero is treated as one.
#[must_use]
pub fn estimate_span(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.split('\n').map(|line| wrap_line(line, width)).sum()
}

fn wrap_line(line: &str, width: usize) -> usize {
    let mut lines = 1;
    let mut col = 0;
    for word in line.split_whitespace() {
        let w = word.width();
        let needed = if col == 0 { w } else { col + 1 + w };
        if needed <= width {
            col = needed;
            continue;
        }
        if col > 0 {
            lines += 1;
        }
        // The word now starts a fresh line and may itself overflow.
        let extra = w.saturating_sub(1) / width;
        lines += extra;
        col = w - extra * width;
    }
    lines
}

#[inline]
fn hash_text(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpanCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Full clears triggered by reaching capacity.
    pub clears: u64,
}

impl SpanCacheStats {
    /// Hit rate in `0.0..=1.0`; zero before any lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoized span estimates keyed by content hash and width.
#[derive(Debug, Clone)]
pub struct SpanCache {
    entries: FxHashMap<(u64, usize), usize>,
    capacity: usize,
    hits: u64,
    misses: u64,
    clears: u64,
}

impl Default for SpanCache {
    fn default() -> Self {
        Self::new(DEFAULT_SPAN_CACHE_CAPACITY)
    }
}

impl SpanCache {
    /// A `capacity` of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity.min(4096), Default::default()),
            capacity,
            hits: 0,
            misses: 0,
            clears: 0,
        }
    }

    /// Span of `text` at `width`, computed on a miss.
    pub fn span(&mut self, text: &str, width: usize) -> usize {
        let key = (hash_text(text), width);
        if let Some(&span) = self.entries.get(&key) {
            self.hits += 1;
            return span;
        }
        self.misses += 1;
        if self.entries.len() >= self.capacity {
            trace!(entries = self.entries.len(), "span cache full; clearing");
            self.entries.clear();
            self.clears += 1;
        }
        let span = estimate_span(text, width);
        self.entries.insert(key, span);
        span
    }

    /// Drop all entries (e.g. after a font change). Stats are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop all entries and zero the stats.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
        self.clears = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> SpanCacheStats {
        SpanCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            clears: self.clears,
        }
    }
}
