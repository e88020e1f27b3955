#![forbid(unsafe_code)]

//! Entry processing for the journal pipeline.
//!
//! Stages, in the order the runtime applies them to each entry:
//!
//! | Stage | Module |
//! |-------|--------|
//! | Exact dedup | [`dedup`] |
//! | Noise filters | [`noise`] |
//! | Classification + coalescing | [`classify`], [`coalesce`] |
//! | Content dedup | [`dedup`] |
//! | Bounded history | [`history`] |

pub mod classify;
pub mod coalesce;
pub mod dedup;
pub mod history;
pub mod noise;
pub mod outcome;

pub use classify::{Classifier, Rule, RuleAction, parse_channel_chat, parse_regions};
pub use coalesce::{EventCoalescer, Paired, RuleId};
pub use dedup::{ContentCheck, DedupKey, Deduper, ExactKey, normalize_text};
pub use history::{HistoryRecord, HistoryStore};
pub use noise::{FilterBuildError, FilterVerdict, NoiseFilter, NoiseFilterChain};
pub use outcome::{Classification, DropReason};
