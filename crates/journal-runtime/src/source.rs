#![forbid(unsafe_code)]

//! Log source and output sink boundaries.

use std::time::Duration;

use journal_core::{RawEntry, Timestamp};
use journal_view::StyledBlock;

/// Failure to pull from the log source. The tick is skipped.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("log source unavailable: {0}")]
    Unavailable(String),
    #[error("log source timed out after {0:?}")]
    Timeout(Duration),
}

/// Supplies raw entries.
///
/// `pull` returns entries with timestamps at or after `since` (all entries
/// when `None`), oldest first. Re-sending already seen entries is allowed.
pub trait LogSource {
    fn pull(&mut self, since: Option<Timestamp>) -> Result<Vec<RawEntry>, SourceError>;
}

impl<T: LogSource + ?Sized> LogSource for Box<T> {
    fn pull(&mut self, since: Option<Timestamp>) -> Result<Vec<RawEntry>, SourceError> {
        (**self).pull(since)
    }
}

/// Failure to render. Logged; the next tick retries.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink rejected render: {0}")]
    Rejected(String),
    #[error("sink I/O error")]
    Io(#[from] std::io::Error),
}

/// Draws styled blocks.
///
/// `origin` is the scroll offset in lines above the newest record.
pub trait OutputSink {
    fn render(&mut self, blocks: &[StyledBlock], origin: usize) -> Result<(), SinkError>;
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn render(&mut self, blocks: &[StyledBlock], origin: usize) -> Result<(), SinkError> {
        (**self).render(blocks, origin)
    }
}
