#![forbid(unsafe_code)]

//! Streaming journal log pipeline.
//!
//! Raw log lines are pulled from a [`LogSource`](runtime::LogSource),
//! deduplicated, filtered for noise, classified into typed events (merging
//! two-line notifications), kept in a bounded history, and rendered through
//! a throttled [`OutputSink`](runtime::OutputSink).
//!
//! # Crates
//!
//! | Module | Crate |
//! |--------|-------|
//! | [`core`] | entries, events, colors, configuration, logging |
//! | [`filter`] | noise filters, classifier, coalescer, dedup, history |
//! | [`view`] | markup, span estimation, viewport, render throttle |
//! | [`runtime`] | engine, run loop, source/sink traits |
//!
//! # Example
//! ```
//! use std::time::Instant;
//! use journal::prelude::*;
//!
//! let mut source = MemorySource::new();
//! source.push(RawEntry::builder(Timestamp::from_secs(1.0), "System", "<Trade> Alice : wts ingots").build());
//!
//! let mut engine = JournalEngine::new(JournalConfig::default(), source, MemorySink::new()).unwrap();
//! engine.tick(Instant::now());
//! assert_eq!(
//!     engine.sink().last_frame().unwrap().plain(),
//!     vec!["[Trade] Alice: wts ingots"]
//! );
//! ```

pub use journal_core as core;
pub use journal_filter as filter;
pub use journal_runtime as runtime;
pub use journal_view as view;

pub mod prelude {
    pub use journal_core::logging::LoggingConfig;
    #[cfg(feature = "subscriber")]
    pub use journal_core::logging::init_subscriber;
    pub use journal_core::{
        ClassifiedEvent, ColoredRegion, ConfigParse, DisplayOrder, EntryCategory, EventKind,
        JournalConfig, RawEntry, Rgb, SourceId, SpeakerColorizer, Timestamp,
    };
    pub use journal_filter::{DropReason, HistoryRecord};
    pub use journal_runtime::{
        EngineError, EngineStats, JournalEngine, LogSource, MemorySink, MemorySource,
        OutputSink, RenderStatus, SinkError, SourceError, StopSignal, StopTrigger, TickReport,
        run,
    };
    pub use journal_view::{StyledBlock, ViewportState};
}
