#![forbid(unsafe_code)]

//! The journal engine: one owned context for the whole pipeline.
//!
//! Each [`JournalEngine::tick`]:
//!
//! 1. expires stale pending windows,
//! 2. pulls from the source at the current watermark (a failed pull skips
//!    the tick and leaves the watermark alone),
//! 3. runs every entry through stale check, exact dedup, noise filters,
//!    classification, content dedup, and history append,
//! 4. advances the watermark to the newest finite timestamp seen,
//! 5. windows the history and renders through the throttle.
//!
//! Per-entry failures are isolated: a malformed entry is logged and kept
//! as best-effort `Other` text, and never aborts the rest of the batch.
//!
//! # Example
//! ```
//! use std::time::Instant;
//! use journal_core::{JournalConfig, RawEntry, Timestamp};
//! use journal_runtime::{JournalEngine, MemorySink, MemorySource};
//!
//! let mut source = MemorySource::new();
//! source.push(RawEntry::builder(Timestamp::from_secs(1.0), "Regular", "hello").speaker("Alice").build());
//!
//! let mut engine = JournalEngine::new(JournalConfig::default(), source, MemorySink::new()).unwrap();
//! let report = engine.tick(Instant::now());
//! assert_eq!(report.accepted, 1);
//! assert_eq!(engine.sink().last_frame().unwrap().plain(), vec!["Alice: hello"]);
//! ```

use std::sync::Arc;
use std::time::Instant;

use journal_core::{
    ClassifiedEvent, ConfigError, EntryError, EventKind, JournalConfig, RawEntry, Timestamp,
};
use journal_filter::{
    Classification, Classifier, ContentCheck, DedupKey, Deduper, DropReason, ExactKey,
    FilterBuildError, FilterVerdict, HistoryStore, NoiseFilterChain, RuleId,
};
use journal_view::{
    BlockFormatter, RenderThrottle, SpanCache, SpanCacheStats, StyledBlock, ThrottleDecision,
    ViewportState, ViewportWindower, content_signature,
};
use tracing::{debug, debug_span, field, trace, warn};

use crate::source::{LogSource, OutputSink};

/// Default render geometry until the host reports its own.
pub const DEFAULT_VIEWPORT_WIDTH: usize = 80;
pub const DEFAULT_VIEWPORT_LINES: usize = 20;

/// Failure to construct an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration ({} problem(s))", .0.len())]
    Config(Vec<ConfigError>),
    #[error(transparent)]
    Filter(#[from] FilterBuildError),
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Appended to history.
    Accepted { seq: u64, evicted: usize },
    /// Absorbed into a pending coalescing window.
    Pending(RuleId),
    Dropped(DropReason),
}

/// Result of the render step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStatus {
    /// The tick ended before rendering (source unavailable).
    #[default]
    NotAttempted,
    Rendered,
    /// Unchanged content within the resend interval.
    Skipped,
    /// The sink failed; the next tick retries.
    Failed,
}

/// Per-tick summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub pulled: usize,
    pub accepted: usize,
    pub pending: usize,
    pub dropped: usize,
    pub malformed: usize,
    pub expired: usize,
    pub source_failed: bool,
    pub render: RenderStatus,
}

/// Cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub ticks: u64,
    pub pulled: u64,
    pub stale: u64,
    pub duplicates: u64,
    pub content_duplicates: u64,
    pub filtered: u64,
    pub hidden: u64,
    pub unclassified: u64,
    pub malformed: u64,
    pub classified: u64,
    /// Lines absorbed into pending coalescing windows.
    pub coalesced: u64,
    pub expired_windows: u64,
    pub evicted: u64,
    pub renders: u64,
    pub render_skips: u64,
    pub render_failures: u64,
    pub source_failures: u64,
}

impl EngineStats {
    fn record_drop(&mut self, reason: &DropReason) {
        match reason {
            DropReason::Stale => self.stale += 1,
            DropReason::Duplicate => self.duplicates += 1,
            DropReason::ContentDuplicate => self.content_duplicates += 1,
            DropReason::Filtered(_) => self.filtered += 1,
            DropReason::ChannelHidden(_) | DropReason::Hidden(_) => self.hidden += 1,
            DropReason::Unclassified => self.unclassified += 1,
        }
    }
}

/// Owns every piece of pipeline state plus the two collaborators.
#[derive(Debug)]
pub struct JournalEngine<S, O> {
    config: Arc<JournalConfig>,
    source: S,
    sink: O,
    chain: NoiseFilterChain,
    classifier: Classifier,
    deduper: Deduper,
    history: HistoryStore,
    formatter: BlockFormatter,
    span_cache: SpanCache,
    viewport: ViewportState,
    windower: ViewportWindower,
    throttle: RenderThrottle,
    watermark: Option<Timestamp>,
    stats: EngineStats,
}

impl<S: LogSource, O: OutputSink> JournalEngine<S, O> {
    /// Validate `config` and assemble the pipeline.
    pub fn new(config: JournalConfig, source: S, sink: O) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        let chain = NoiseFilterChain::from_config(&config)?;
        let config = Arc::new(config);
        debug!(
            config = %config.summary_short(),
            filters = ?chain.names().collect::<Vec<_>>(),
            "journal engine created"
        );
        Ok(Self {
            classifier: Classifier::new(Arc::clone(&config)),
            deduper: Deduper::new(config.content_dedup),
            history: HistoryStore::new(config.max_history),
            formatter: BlockFormatter::new(config.show_timestamps),
            span_cache: SpanCache::new(config.span_cache_capacity),
            viewport: ViewportState::default(),
            windower: ViewportWindower::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_LINES),
            throttle: RenderThrottle::new(config.min_resend_interval()),
            watermark: None,
            stats: EngineStats::default(),
            chain,
            source,
            sink,
            config,
        })
    }

    /// Set render geometry in columns and lines.
    #[must_use]
    pub fn with_viewport(mut self, width: usize, lines: usize) -> Self {
        self.set_viewport(width, lines);
        self
    }

    pub fn set_viewport(&mut self, width: usize, lines: usize) {
        self.windower = ViewportWindower::new(width, lines);
    }

    /// Run one ingestion + render cycle.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let span = debug_span!(
            "journal.tick",
            pulled = field::Empty,
            accepted = field::Empty,
            rendered = field::Empty
        );
        let _guard = span.enter();

        self.stats.ticks += 1;
        let mut report = TickReport::default();

        let expired = self.classifier.expire_if_past(now);
        if !expired.is_empty() {
            let rules: Vec<_> = expired.iter().map(|r| r.name()).collect();
            debug!(?rules, "pending windows expired");
            report.expired = expired.len();
            self.stats.expired_windows += expired.len() as u64;
        }

        let batch = match self.source.pull(self.watermark) {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, watermark = ?self.watermark, "log source pull failed; skipping tick");
                self.stats.source_failures += 1;
                report.source_failed = true;
                return report;
            }
        };
        report.pulled = batch.len();
        self.stats.pulled += batch.len() as u64;

        let malformed_before = self.stats.malformed;
        let mut newest = self.watermark;
        for entry in &batch {
            let ts = entry.timestamp();
            // NaN and infinities sort above every real time; they must not
            // become the watermark or every later entry would be stale.
            if ts.is_finite() {
                newest = Some(newest.map_or(ts, |w| w.max(ts)));
            }

            match self.ingest(entry, now) {
                Outcome::Accepted { .. } => report.accepted += 1,
                Outcome::Pending(_) => report.pending += 1,
                Outcome::Dropped(_) => report.dropped += 1,
            }
        }
        report.malformed = (self.stats.malformed - malformed_before) as usize;
        self.watermark = newest;

        report.render = self.render(now);

        span.record("pulled", report.pulled);
        span.record("accepted", report.accepted);
        span.record("rendered", report.render == RenderStatus::Rendered);
        report
    }

    /// Run one entry through the pipeline. Never fails the batch.
    fn ingest(&mut self, entry: &RawEntry, now: Instant) -> Outcome {
        let outcome = match self.process_entry(entry, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "malformed entry; keeping best-effort text");
                self.stats.malformed += 1;
                self.salvage(entry)
            }
        };
        match &outcome {
            Outcome::Accepted { seq, evicted } => {
                trace!(seq, evicted, "entry accepted");
                self.stats.classified += 1;
            }
            Outcome::Pending(rule) => {
                trace!(rule = rule.name(), "entry held for coalescing");
                self.stats.coalesced += 1;
            }
            Outcome::Dropped(reason) => {
                trace!(%reason, ts = %entry.timestamp(), "entry dropped");
                self.stats.record_drop(reason);
            }
        }
        outcome
    }

    /// Stale check, exact dedup, validation, filters, and classification.
    ///
    /// `Err` means the entry is malformed; the caller decides what to keep.
    pub fn process_entry(&mut self, entry: &RawEntry, now: Instant) -> Result<Outcome, EntryError> {
        if self.watermark.is_some_and(|w| entry.timestamp() < w) {
            return Ok(Outcome::Dropped(DropReason::Stale));
        }
        if self.deduper.check_exact(entry).is_none() {
            return Ok(Outcome::Dropped(DropReason::Duplicate));
        }
        entry.validate()?;

        if let FilterVerdict::Reject(name) = self.chain.evaluate(entry) {
            return Ok(Outcome::Dropped(DropReason::Filtered(name)));
        }

        Ok(match self.classifier.classify(entry, now) {
            Classification::Event(event) => self.accept(event, entry),
            Classification::Pending(rule) => Outcome::Pending(rule),
            Classification::Dropped(reason) => Outcome::Dropped(reason),
        })
    }

    /// Keep a malformed entry as `Other` if that category is shown.
    fn salvage(&mut self, entry: &RawEntry) -> Outcome {
        if !self.config.is_category_visible(EventKind::Other.key()) {
            return Outcome::Dropped(DropReason::Hidden(EventKind::Other));
        }
        let text = entry.salvage_text();
        if text.is_empty() {
            return Outcome::Dropped(DropReason::Unclassified);
        }
        self.accept(ClassifiedEvent::Other { text }, entry)
    }

    fn accept(&mut self, event: ClassifiedEvent, entry: &RawEntry) -> Outcome {
        let content = match self.deduper.check_content(&event) {
            ContentCheck::Duplicate => return Outcome::Dropped(DropReason::ContentDuplicate),
            ContentCheck::Fresh(content) => content,
        };
        let key = DedupKey {
            exact: ExactKey::of(entry),
            content,
        };
        self.deduper.record(&key);

        let evicted = self.history.push(event, entry.timestamp(), key);
        if evicted > 0 {
            self.deduper.rebuild(self.history.dedup_keys());
            self.stats.evicted += evicted as u64;
            debug!(evicted, retained = self.history.len(), "history evicted oldest records");
        }
        let seq = self.history.newest().map_or(0, |r| r.seq);
        Outcome::Accepted { seq, evicted }
    }

    /// Window, format, and send unless throttled.
    fn render(&mut self, now: Instant) -> RenderStatus {
        let window = self
            .windower
            .select(&self.history, &mut self.viewport, &mut self.span_cache);
        let blocks: Vec<StyledBlock> = window
            .indices(self.config.display_order)
            .into_iter()
            .filter_map(|i| self.history.get(i))
            .map(|record| self.formatter.format(record))
            .collect();

        let signature = content_signature(blocks.iter().map(|b| b.plain.as_str()));
        if self.throttle.check(signature, now) == ThrottleDecision::Skip {
            trace!(blocks = blocks.len(), "render skipped; content unchanged");
            self.stats.render_skips += 1;
            return RenderStatus::Skipped;
        }

        match self.sink.render(&blocks, window.offset_lines) {
            Ok(()) => {
                self.throttle.mark_rendered(signature, now);
                self.stats.renders += 1;
                trace!(blocks = blocks.len(), origin = window.offset_lines, "rendered");
                RenderStatus::Rendered
            }
            Err(err) => {
                warn!(error = %err, "render failed; retrying next tick");
                self.stats.render_failures += 1;
                RenderStatus::Failed
            }
        }
    }
}

impl<S, O> JournalEngine<S, O> {
    /// Clear history, dedup sets, pending windows, caches, viewport,
    /// throttle, watermark, and counters.
    pub fn reset(&mut self) {
        self.history.clear();
        self.deduper.clear();
        self.classifier.reset();
        self.span_cache.reset();
        self.viewport = ViewportState::default();
        self.throttle.reset();
        self.watermark = None;
        self.stats = EngineStats::default();
        debug!("journal engine reset");
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.viewport.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.viewport.scroll_down(lines);
    }

    pub fn page_up(&mut self) {
        self.viewport.page_up(self.windower.available_lines());
    }

    pub fn page_down(&mut self) {
        self.viewport.page_down(self.windower.available_lines());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom();
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub fn watermark(&self) -> Option<Timestamp> {
        self.watermark
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    #[must_use]
    pub fn span_cache_stats(&self) -> SpanCacheStats {
        self.span_cache.stats()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.classifier.coalescer().has_pending()
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut O {
        &mut self.sink
    }
}
