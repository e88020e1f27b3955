#![forbid(unsafe_code)]

//! Core: entry model, classified events, colors, configuration, and logging
//! for the journal pipeline.

pub mod color;
pub mod config;
pub mod entry;
pub mod event;
pub mod logging;

pub use color::{Rgb, SpeakerColorizer};
pub use config::{ConfigError, ConfigLoadError, ConfigParse, DisplayOrder, JournalConfig};
pub use entry::{EntryCategory, EntryError, RawEntry, SourceId, Timestamp};
pub use event::{ClassifiedEvent, ColoredRegion, EventKind};
