#![forbid(unsafe_code)]

//! In-memory [`LogSource`] and [`OutputSink`] for tests and demos.

use journal_core::{RawEntry, Timestamp};
use journal_view::StyledBlock;

use crate::source::{LogSource, OutputSink, SinkError, SourceError};

/// Append-only entry list that re-sends everything at or after the
/// requested watermark, like a client that keeps a scrollback window.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<RawEntry>,
    fail_next: usize,
    pulls: usize,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RawEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = RawEntry>) {
        self.entries.extend(entries);
    }

    /// Make the next `n` pulls fail.
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    /// Successful and failed pulls so far.
    #[must_use]
    pub fn pulls(&self) -> usize {
        self.pulls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LogSource for MemorySource {
    fn pull(&mut self, since: Option<Timestamp>) -> Result<Vec<RawEntry>, SourceError> {
        self.pulls += 1;
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(SourceError::Unavailable("simulated outage".into()));
        }
        let mut batch: Vec<RawEntry> = self
            .entries
            .iter()
            .filter(|e| since.is_none_or(|w| e.timestamp() >= w))
            .cloned()
            .collect();
        batch.sort_by_key(RawEntry::timestamp);
        Ok(batch)
    }
}

/// One successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub blocks: Vec<StyledBlock>,
    pub origin: usize,
}

impl Frame {
    /// Plain texts in on-screen order.
    #[must_use]
    pub fn plain(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.plain.as_str()).collect()
    }
}

/// Records every frame it is asked to render.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Vec<Frame>,
    fail_next: usize,
    attempts: usize,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` renders fail.
    pub fn fail_next(&mut self, n: usize) {
        self.fail_next = n;
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Calls to `render`, including failed ones.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl OutputSink for MemorySink {
    fn render(&mut self, blocks: &[StyledBlock], origin: usize) -> Result<(), SinkError> {
        self.attempts += 1;
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(SinkError::Rejected("simulated failure".into()));
        }
        self.frames.push(Frame {
            blocks: blocks.to_vec(),
            origin,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: f64, text: &str) -> RawEntry {
        RawEntry::builder(Timestamp::from_secs(ts), "System", text).build()
    }

    #[test]
    fn pull_resends_from_watermark() {
        let mut source = MemorySource::new();
        source.extend([entry(1.0, "a"), entry(2.0, "b"), entry(3.0, "c")]);
        let batch = source.pull(Some(Timestamp::from_secs(2.0))).unwrap();
        let texts: Vec<_> = batch.iter().map(RawEntry::text).collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert_eq!(source.pull(None).unwrap().len(), 3);
    }

    #[test]
    fn pull_sorts_by_timestamp() {
        let mut source = MemorySource::new();
        source.extend([entry(2.0, "late"), entry(1.0, "early")]);
        let batch = source.pull(None).unwrap();
        assert_eq!(batch[0].text(), "early");
    }

    #[test]
    fn simulated_failures() {
        let mut source = MemorySource::new();
        source.fail_next(1);
        assert!(source.pull(None).is_err());
        assert!(source.pull(None).is_ok());
        assert_eq!(source.pulls(), 2);

        let mut sink = MemorySink::new();
        sink.fail_next(1);
        assert!(sink.render(&[], 0).is_err());
        assert!(sink.render(&[], 0).is_ok());
        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.frames().len(), 1);
    }
}
