#![forbid(unsafe_code)]

//! The cooperative run loop.
//!
//! Ticks at a fixed interval plus uniform random jitter so several
//! journals polling the same client do not fall into lockstep. The stop
//! signal is checked between ticks; a tick in progress always completes.

use std::time::{Duration, Instant};

use rand::{Rng, rng};
use tracing::info;

use crate::engine::JournalEngine;
use crate::source::{LogSource, OutputSink};
use crate::stop::StopSignal;

/// Interval plus `0..=jitter` between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    pub interval: Duration,
    pub jitter: Duration,
}

impl TickSchedule {
    #[must_use]
    pub const fn new(interval: Duration, jitter: Duration) -> Self {
        Self { interval, jitter }
    }

    /// Delay before the next tick.
    #[must_use]
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        self.interval + Duration::from_millis(rng.random_range(0..=jitter_ms))
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed: Duration,
}

/// Tick `engine` until `stop` fires.
pub fn run<S, O>(engine: &mut JournalEngine<S, O>, stop: &StopSignal) -> RunSummary
where
    S: LogSource,
    O: OutputSink,
{
    let schedule = TickSchedule::new(
        engine.config().tick_interval(),
        Duration::from_millis(engine.config().tick_jitter_ms),
    );
    let mut rng = rng();
    let started = Instant::now();
    let mut ticks = 0u64;

    info!(config = %engine.config().summary_short(), "journal loop started");
    while !stop.is_stopped() {
        engine.tick(Instant::now());
        ticks += 1;
        if stop.wait_timeout(schedule.next_delay(&mut rng)) {
            break;
        }
    }

    let summary = RunSummary {
        ticks,
        elapsed: started.elapsed(),
    };
    info!(ticks, elapsed_ms = summary.elapsed.as_millis() as u64, "journal loop stopped");
    summary
}
