#![forbid(unsafe_code)]

//! Two-level duplicate suppression.
//!
//! - **Exact**: the `(timestamp, source, raw text)` triple. A source may
//!   return the same entry on every pull, so keys are remembered for every
//!   retained record and for every entry seen at the newest timestamp (the
//!   *frontier*), including entries that were later dropped.
//! - **Content**: lowercase, whitespace-collapsed rendering of the classified
//!   event. Coalesced quest events are exempt so repeated quests with the
//!   same title still show.
//!
//! Retained-record keys are rebuilt from history after eviction, so an
//! evicted record's content may appear again.

use journal_core::{ClassifiedEvent, RawEntry, SourceId, Timestamp};
use rustc_hash::FxHashSet;

/// Exact identity of a raw entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactKey {
    timestamp_bits: u64,
    source_id: SourceId,
    text: String,
}

impl ExactKey {
    #[must_use]
    pub fn of(entry: &RawEntry) -> Self {
        Self {
            timestamp_bits: entry.timestamp().key_bits(),
            source_id: entry.source_id(),
            text: entry.text().to_string(),
        }
    }
}

/// Both dedup keys for one accepted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupKey {
    pub exact: ExactKey,
    /// `None` for events exempt from content dedup.
    pub content: Option<String>,
}

/// Lowercase and collapse runs of whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Content key for an event, or `None` if the event is exempt.
#[must_use]
pub fn content_key(event: &ClassifiedEvent) -> Option<String> {
    match event {
        ClassifiedEvent::Quest { .. } => None,
        other => Some(normalize_text(&other.plain_text())),
    }
}

/// Outcome of the content check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCheck {
    /// Not seen; carries the key to record on acceptance.
    Fresh(Option<String>),
    Duplicate,
}

/// Remembers exact and content keys.
#[derive(Debug, Clone, Default)]
pub struct Deduper {
    content_enabled: bool,
    exact: FxHashSet<ExactKey>,
    content: FxHashSet<String>,
    frontier: Option<Timestamp>,
    frontier_keys: FxHashSet<ExactKey>,
}

impl Deduper {
    #[must_use]
    pub fn new(content_enabled: bool) -> Self {
        Self {
            content_enabled,
            ..Self::default()
        }
    }

    /// Check and remember the exact key.
    ///
    /// Returns `None` for a repeat, otherwise the key to record if the entry
    /// is eventually accepted.
    pub fn check_exact(&mut self, entry: &RawEntry) -> Option<ExactKey> {
        let key = ExactKey::of(entry);
        if self.exact.contains(&key) || self.frontier_keys.contains(&key) {
            return None;
        }
        let ts = entry.timestamp();
        match self.frontier {
            // Remembered for this frontier only; never moves it.
            _ if !ts.is_finite() => {
                self.frontier_keys.insert(key.clone());
            }
            Some(frontier) if ts < frontier => {}
            Some(frontier) if ts == frontier => {
                self.frontier_keys.insert(key.clone());
            }
            _ => {
                self.frontier = Some(ts);
                self.frontier_keys.clear();
                self.frontier_keys.insert(key.clone());
            }
        }
        Some(key)
    }

    /// Check a classified event against retained content keys.
    #[must_use]
    pub fn check_content(&self, event: &ClassifiedEvent) -> ContentCheck {
        if !self.content_enabled {
            return ContentCheck::Fresh(None);
        }
        match content_key(event) {
            Some(key) if self.content.contains(&key) => ContentCheck::Duplicate,
            key => ContentCheck::Fresh(key),
        }
    }

    /// Remember the keys of an accepted record.
    pub fn record(&mut self, key: &DedupKey) {
        self.exact.insert(key.exact.clone());
        if let Some(content) = &key.content {
            self.content.insert(content.clone());
        }
    }

    /// Rebuild retained-record keys after eviction. Frontier keys are kept.
    pub fn rebuild<'a>(&mut self, keys: impl IntoIterator<Item = &'a DedupKey>) {
        self.exact.clear();
        self.content.clear();
        for key in keys {
            self.record(key);
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.exact.clear();
        self.content.clear();
        self.frontier = None;
        self.frontier_keys.clear();
    }

    /// Number of remembered exact keys (retained plus frontier).
    #[must_use]
    pub fn exact_len(&self) -> usize {
        self.exact.len() + self.frontier_keys.len()
    }

    #[must_use]
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}
