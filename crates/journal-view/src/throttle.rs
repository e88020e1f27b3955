#![forbid(unsafe_code)]

//! Signature-based render throttling.
//!
//! A render is skipped when the windowed content hashes to the same
//! signature as the last *successful* render and the minimum resend
//! interval has not yet elapsed. Failed renders leave the state untouched,
//! so the next tick retries.
//!
//! Time is passed in explicitly (`now: Instant`) so behavior is
//! deterministic under test.

use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use rustc_hash::FxHasher;

/// Hash of an ordered sequence of plain texts.
#[must_use]
pub fn content_signature<'a, I>(plains: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = FxHasher::default();
    let mut count = 0usize;
    for plain in plains {
        plain.hash(&mut hasher);
        count += 1;
    }
    count.hash(&mut hasher);
    hasher.finish()
}

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Render,
    /// Same content as the last successful render, within the interval.
    Skip,
}

/// Gate in front of the output sink.
#[derive(Debug, Clone)]
pub struct RenderThrottle {
    min_interval: Duration,
    last: Option<(u64, Instant)>,
}

impl RenderThrottle {
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    #[must_use]
    pub fn check(&self, signature: u64, now: Instant) -> ThrottleDecision {
        match self.last {
            Some((last_sig, sent_at))
                if last_sig == signature
                    && now.saturating_duration_since(sent_at) < self.min_interval =>
            {
                ThrottleDecision::Skip
            }
            _ => ThrottleDecision::Render,
        }
    }

    /// Record a successful render.
    pub fn mark_rendered(&mut self, signature: u64, now: Instant) {
        self.last = Some((signature, now));
    }

    #[must_use]
    pub fn last_signature(&self) -> Option<u64> {
        self.last.map(|(sig, _)| sig)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
