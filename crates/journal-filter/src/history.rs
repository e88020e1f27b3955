#![forbid(unsafe_code)]

//! Bounded, append-only event history.
//!
//! Records are kept oldest-first in a `VecDeque`. Appending past the bound
//! evicts from the front, so the newest `max_records` always survive.
//!
//! # Example
//!
//! ```
//! use journal_core::{ClassifiedEvent, RawEntry, Timestamp};
//! use journal_filter::dedup::{DedupKey, ExactKey};
//! use journal_filter::history::HistoryStore;
//!
//! let mut history = HistoryStore::new(2);
//! for (i, text) in ["a", "b", "c"].into_iter().enumerate() {
//!     let ts = Timestamp::from_secs(i as f64);
//!     let entry = RawEntry::builder(ts, "System", text).build();
//!     let key = DedupKey { exact: ExactKey::of(&entry), content: None };
//!     history.push(ClassifiedEvent::Other { text: text.into() }, ts, key);
//! }
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.newest().map(|r| r.plain.as_str()), Some("c"));
//! ```

use std::collections::VecDeque;

use journal_core::{ClassifiedEvent, Timestamp};

use crate::dedup::DedupKey;

/// One accepted event.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Monotonic sequence number, unique for the life of the store.
    pub seq: u64,
    pub event: ClassifiedEvent,
    pub received_at: Timestamp,
    /// Cached [`ClassifiedEvent::plain_text`].
    pub plain: String,
    pub dedup_key: DedupKey,
}

/// Bounded FIFO of [`HistoryRecord`]s.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    records: VecDeque<HistoryRecord>,
    max_records: usize,
    next_seq: u64,
    evicted_total: u64,
}

impl HistoryStore {
    /// A `max_records` of zero is treated as one.
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        let max_records = max_records.max(1);
        Self {
            records: VecDeque::with_capacity(max_records.min(1024)),
            max_records,
            next_seq: 0,
            evicted_total: 0,
        }
    }

    /// Append a record, evicting the oldest beyond the bound.
    ///
    /// Returns the number of records evicted.
    pub fn push(
        &mut self,
        event: ClassifiedEvent,
        received_at: Timestamp,
        dedup_key: DedupKey,
    ) -> usize {
        let plain = event.plain_text();
        self.records.push_back(HistoryRecord {
            seq: self.next_seq,
            event,
            received_at,
            plain,
            dedup_key,
        });
        self.next_seq += 1;
        self.trim_front()
    }

    fn trim_front(&mut self) -> usize {
        let excess = self.records.len().saturating_sub(self.max_records);
        if excess > 0 {
            self.records.drain(..excess);
            self.evicted_total += excess as u64;
        }
        excess
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
    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Total records evicted since creation or the last [`clear`](Self::clear).
    #[must_use]
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total
    }

    /// Record at `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn newest(&self) -> Option<&HistoryRecord> {
        self.records.back()
    }

    /// Oldest-first iterator.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Dedup keys of every retained record.
    pub fn dedup_keys(&self) -> impl Iterator<Item = &DedupKey> {
        self.records.iter().map(|r| &r.dedup_key)
    }

    /// Drop all records. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
        self.evicted_total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::ExactKey;
    use journal_core::RawEntry;

    fn push_text(store: &mut HistoryStore, i: usize) -> usize {
        let ts = Timestamp::from_secs(i as f64);
        let text = format!("line {i}");
        let entry = RawEntry::builder(ts, "System", text.as_str()).build();
        let key = DedupKey {
            exact: ExactKey::of(&entry),
            content: Some(text.clone()),
        };
        store.push(ClassifiedEvent::Other { text }, ts, key)
    }

    #[test]
    fn bound_is_enforced() {
        let mut store = HistoryStore::new(3);
        for i in 0..3 {
            assert_eq!(push_text(&mut store, i), 0);
        }
        assert_eq!(push_text(&mut store, 3), 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.evicted_total(), 1);
        let texts: Vec<_> = store.iter().map(|r| r.plain.as_str()).collect();
        assert_eq!(texts, vec!["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut store = HistoryStore::new(2);
        for i in 0..5 {
            push_text(&mut store, i);
        }
        let seqs: Vec<_> = store.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![3, 4]);
    }

    #[test]
    fn zero_bound_keeps_one() {
        let mut store = HistoryStore::new(0);
        push_text(&mut store, 0);
        push_text(&mut store, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.max_records(), 1);
    }

    #[test]
    fn dedup_keys_follow_retained_records() {
        let mut store = HistoryStore::new(2);
        for i in 0..4 {
            push_text(&mut store, i);
        }
        let contents: Vec<_> = store
            .dedup_keys()
            .filter_map(|k| k.content.as_deref())
            .collect();
        assert_eq!(contents, vec!["line 2", "line 3"]);
    }

    #[test]
    fn clear_empties() {
        let mut store = HistoryStore::new(2);
        push_text(&mut store, 0);
        store.clear();
        assert!(store.is_empty());
        assert!(store.newest().is_none());
    }
}
