#![forbid(unsafe_code)]

//! Raw log entries as delivered by a log source.
//!
//! A [`RawEntry`] is immutable once read. The pipeline processes each entry
//! exactly once and either discards it or promotes it to a history record.
//!
//! # Example
//!
//! ```
//! use journal_core::entry::{EntryCategory, RawEntry, Timestamp};
//!
//! let entry = RawEntry::builder(Timestamp::from_secs(12.5), "Regular", "hail and well met")
//!     .speaker("Alice")
//!     .source_id(7)
//!     .build();
//!
//! assert_eq!(entry.category(), EntryCategory::Regular);
//! assert_eq!(entry.speaker(), Some("Alice"));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic log timestamp in seconds.
///
/// Log sources report fractional seconds. Ordering and equality use the
/// total order of `f64` so timestamps can be compared and used as keys.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Timestamp at the source's origin.
    pub const ZERO: Self = Self(0.0);

    /// Create a timestamp from seconds.
    #[must_use]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds since the source's origin.
    #[must_use]
    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// Whether the timestamp can order entries; NaN and infinities cannot.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Bit pattern used for hashing in dedup keys.
    #[must_use]
    pub fn key_bits(self) -> u64 {
        // -0.0 and 0.0 must collapse to one key.
        if self.0 == 0.0 { 0 } else { self.0.to_bits() }
    }

    /// The later of two timestamps.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other > self { other } else { self }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.0.total_cmp(&other.0)
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Opaque identifier of the object that produced an entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of log categories.
///
/// Sources report the category as a free-form tag; it is parsed once here
/// so downstream code matches on variants instead of strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryCategory {
    System,
    Regular,
    Guild,
    Alliance,
    Party,
    Whisper,
    Emote,
    Yell,
    Label,
    Spell,
    /// A tag this build does not know about (stored lowercase).
    Unknown(String),
}

impl EntryCategory {
    /// Parse a source tag (case-insensitive, surrounding whitespace ignored).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        let lower = tag.to_ascii_lowercase();
        match lower.as_str() {
            "system" => Self::System,
            "regular" | "say" => Self::Regular,
            "guild" => Self::Guild,
            "alliance" => Self::Alliance,
            "party" => Self::Party,
            "whisper" => Self::Whisper,
            "emote" => Self::Emote,
            "yell" => Self::Yell,
            "label" => Self::Label,
            "spell" => Self::Spell,
            _ => Self::Unknown(lower),
        }
    }

    /// Whether entries of this category are spoken by a named speaker.
    #[must_use]
    pub fn is_speech(&self) -> bool {
        matches!(
            self,
            Self::Regular
                | Self::Guild
                | Self::Alliance
                | Self::Party
                | Self::Whisper
                | Self::Emote
                | Self::Yell
        )
    }

    /// Visibility key used by `category_visibility`.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Regular => "regular",
            Self::Guild => "guild",
            Self::Alliance => "alliance",
            Self::Party => "party",
            Self::Whisper => "whisper",
            Self::Emote => "emote",
            Self::Yell => "yell",
            Self::Label => "label",
            Self::Spell => "spell",
            Self::Unknown(tag) => tag.as_str(),
        }
    }
}

/// Why an entry could not be processed as delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    /// A field the pipeline relies on is missing or invalid.
    #[error("malformed entry {source_id} at {timestamp}: {reason}")]
    Malformed {
        timestamp: Timestamp,
        source_id: SourceId,
        reason: &'static str,
    },
}

/// One line pulled from the log source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    timestamp: Timestamp,
    category_tag: String,
    #[serde(default)]
    speaker: Option<String>,
    text: String,
    #[serde(default)]
    source_id: SourceId,
}

impl RawEntry {
    /// Start building an entry with the three required fields.
    #[must_use]
    pub fn builder(
        timestamp: Timestamp,
        category_tag: impl Into<String>,
        text: impl Into<String>,
    ) -> RawEntryBuilder {
        RawEntryBuilder {
            entry: Self {
                timestamp,
                category_tag: category_tag.into(),
                speaker: None,
                text: text.into(),
                source_id: SourceId::default(),
            },
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The tag exactly as the source reported it.
    #[must_use]
    pub fn category_tag(&self) -> &str {
        &self.category_tag
    }

    #[must_use]
    pub fn category(&self) -> EntryCategory {
        EntryCategory::from_tag(&self.category_tag)
    }

    /// Speaker name, with blank names treated as absent.
    #[must_use]
    pub fn speaker(&self) -> Option<&str> {
        self.speaker
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// Check the fields the classifier depends on.
    pub fn validate(&self) -> Result<(), EntryError> {
        let reason = if !self.timestamp.is_finite() {
            Some("non-finite timestamp")
        } else if self.category_tag.trim().is_empty() {
            Some("missing category tag")
        } else if self.text.trim().is_empty() {
            Some("empty text")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(EntryError::Malformed {
                timestamp: self.timestamp,
                source_id: self.source_id,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Best-effort text for an entry that failed validation.
    #[must_use]
    pub fn salvage_text(&self) -> String {
        let text = self.text.trim();
        match (self.speaker(), text.is_empty()) {
            (Some(speaker), true) => speaker.to_string(),
            (Some(speaker), false) => format!("{speaker}: {text}"),
            (None, _) => text.to_string(),
        }
    }
}

/// Builder for [`RawEntry`].
#[derive(Clone, Debug)]
#[must_use]
pub struct RawEntryBuilder {
    entry: RawEntry,
}

impl RawEntryBuilder {
    pub fn speaker(mut self, speaker: impl Into<String>) -> Self {
        self.entry.speaker = Some(speaker.into());
        self
    }

    pub fn source_id(mut self, id: u64) -> Self {
        self.entry.source_id = SourceId(id);
        self
    }

    pub fn build(self) -> RawEntry {
        self.entry
    }
}
