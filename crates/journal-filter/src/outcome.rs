#![forbid(unsafe_code)]

//! Per-entry outcomes.
//!
//! Dropping an entry is an intentional, terminal result rather than an
//! error. Each reason is kept distinct so counters and logs can tell them
//! apart.

use std::fmt;

use journal_core::{ClassifiedEvent, EventKind};

use crate::coalesce::RuleId;

/// Why an entry produced no history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Older than the ingestion watermark.
    Stale,
    /// Exact `(timestamp, source, text)` repeat.
    Duplicate,
    /// Same normalized text as a retained record.
    ContentDuplicate,
    /// Rejected by the named noise filter.
    Filtered(&'static str),
    /// Chat on a channel that is switched off.
    ChannelHidden(String),
    /// Event category that is switched off.
    Hidden(EventKind),
    /// No rule produced a displayable event.
    Unclassified,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => f.write_str("stale"),
            Self::Duplicate => f.write_str("duplicate"),
            Self::ContentDuplicate => f.write_str("content duplicate"),
            Self::Filtered(name) => write!(f, "filtered by {name}"),
            Self::ChannelHidden(channel) => write!(f, "channel {channel} hidden"),
            Self::Hidden(kind) => write!(f, "{kind} hidden"),
            Self::Unclassified => f.write_str("unclassified"),
        }
    }
}

/// Result of classifying one filtered entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A complete event ready for dedup and history.
    Event(ClassifiedEvent),
    /// Absorbed into coalescing state; nothing to emit yet.
    Pending(RuleId),
    Dropped(DropReason),
}

impl Classification {
    #[must_use]
    pub fn into_event(self) -> Option<ClassifiedEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Pending(_) | Self::Dropped(_) => None,
        }
    }
}
