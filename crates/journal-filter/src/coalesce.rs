#![forbid(unsafe_code)]

//! Time-bounded coalescing of two-line notifications.
//!
//! Some notifications arrive as two separate log lines: a *trigger* carrying
//! a title and a *detail* carrying the rest. [`EventCoalescer`] holds at most
//! one pending half per rule, with a wall-clock deadline, and hands back the
//! other half when its counterpart shows up in time.
//!
//! # Rules
//!
//! - **Trigger**: store the partial payload until `now + window` (latest wins).
//!   If a detail is already waiting, pair immediately.
//! - **Detail**: pair with a waiting trigger, otherwise wait in the same slot
//!   for a trigger that arrives slightly later. An unpaired detail expires
//!   silently.
//! - **Marker**: arms the slot without a payload. A list line may consume the
//!   marker while it is live, or after expiry as long as no unrelated line
//!   has been seen since.
//!
//! [`EventCoalescer::expire_if_past`] must run once per tick before any
//! classification so stale halves never pair.
//!
//! # Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use journal_filter::coalesce::{EventCoalescer, Paired, RuleId};
//!
//! let mut coalescer = EventCoalescer::new(Duration::from_secs(3));
//! let now = Instant::now();
//!
//! assert_eq!(coalescer.on_trigger(RuleId::Quest, "Foo!".into(), now), None);
//! let paired = coalescer.on_detail(RuleId::Quest, "Bar".into(), now);
//! assert_eq!(paired, Some(Paired { trigger: "Foo!".into(), detail: "Bar".into() }));
//! assert!(!coalescer.has_pending());
//! ```

use std::time::{Duration, Instant};

use tracing::trace;

/// Rules that keep pending state between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    DangerZone,
    Quest,
}

const RULE_COUNT: usize = 2;

impl RuleId {
    pub const ALL: [Self; RULE_COUNT] = [Self::DangerZone, Self::Quest];

    const fn slot(self) -> usize {
        match self {
            Self::DangerZone => 0,
            Self::Quest => 1,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DangerZone => "danger_zone",
            Self::Quest => "quest",
        }
    }
}

/// The half of a two-line event that is waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partial {
    /// Trigger seen, waiting for its detail.
    Trigger(String),
    /// Detail seen first, waiting for its trigger.
    Detail(String),
    /// Payload-free start marker.
    Marker,
}

/// Pending half with its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub partial: Partial,
    pub created_at: Instant,
    pub deadline: Instant,
}

impl Pending {
    #[must_use]
    pub fn is_live(&self, now: Instant) -> bool {
        now <= self.deadline
    }
}

/// Both halves of a coalesced pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paired {
    pub trigger: String,
    pub detail: String,
}

/// Holds pending coalescing state, one slot per [`RuleId`].
///
/// # Performance
///
/// All operations are O(1); memory is bounded by the number of rules.
#[derive(Debug, Clone)]
pub struct EventCoalescer {
    window: Duration,
    slots: [Option<Pending>; RULE_COUNT],
    /// Marker seen and no unrelated line classified since.
    marker_adjacent: [bool; RULE_COUNT],
}

impl EventCoalescer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: Default::default(),
            marker_adjacent: [false; RULE_COUNT],
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Drop every pending half whose deadline has passed.
    ///
    /// Returns the rules whose state expired.
    pub fn expire_if_past(&mut self, now: Instant) -> Vec<RuleId> {
        let mut expired = Vec::new();
        for rule in RuleId::ALL {
            let slot = &mut self.slots[rule.slot()];
            if slot.as_ref().is_some_and(|p| !p.is_live(now)) {
                if let Some(pending) = slot.take() {
                    trace!(rule = rule.name(), partial = ?pending.partial, "pending window expired");
                }
                expired.push(rule);
            }
        }
        expired
    }

    /// A trigger line arrived.
    ///
    /// Returns the pair if a detail was already waiting; otherwise stores the
    /// trigger, replacing whatever the slot held.
    pub fn on_trigger(&mut self, rule: RuleId, payload: String, now: Instant) -> Option<Paired> {
        if let Some(Partial::Detail(detail)) = self.take_live(rule, now) {
            return Some(Paired {
                trigger: payload,
                detail,
            });
        }
        self.store(rule, Partial::Trigger(payload), now);
        None
    }

    /// A detail line arrived.
    ///
    /// Returns the pair if a trigger was waiting; otherwise holds the detail
    /// for the same window in case its trigger is slightly late.
    pub fn on_detail(&mut self, rule: RuleId, payload: String, now: Instant) -> Option<Paired> {
        if let Some(Partial::Trigger(trigger)) = self.take_live(rule, now) {
            return Some(Paired {
                trigger,
                detail: payload,
            });
        }
        self.store(rule, Partial::Detail(payload), now);
        None
    }

    /// A payload-free marker arrived.
    pub fn on_marker(&mut self, rule: RuleId, now: Instant) {
        self.store(rule, Partial::Marker, now);
        self.marker_adjacent[rule.slot()] = true;
    }

    /// Consume a marker for `rule`.
    ///
    /// Succeeds if a live marker is pending, or if the last classified line
    /// was the marker itself (even past its window).
    pub fn take_marker(&mut self, rule: RuleId, now: Instant) -> bool {
        let idx = rule.slot();
        let adjacent = std::mem::take(&mut self.marker_adjacent[idx]);
        let live = matches!(
            &self.slots[idx],
            Some(Pending { partial: Partial::Marker, deadline, .. }) if now <= *deadline
        );
        if live || adjacent {
            if matches!(self.slots[idx].as_ref().map(|p| &p.partial), Some(Partial::Marker)) {
                self.slots[idx] = None;
            }
            return true;
        }
        false
    }

    /// Any line that is not part of `rule`'s marker/list pair was classified.
    pub fn note_unrelated(&mut self, rule: RuleId) {
        self.marker_adjacent[rule.slot()] = false;
    }

    #[must_use]
    pub fn pending(&self, rule: RuleId) -> Option<&Pending> {
        self.slots[rule.slot()].as_ref()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Discard all pending state.
    pub fn clear(&mut self) {
        self.slots = Default::default();
        self.marker_adjacent = [false; RULE_COUNT];
    }

    fn store(&mut self, rule: RuleId, partial: Partial, now: Instant) {
        let deadline = now + self.window;
        let slot = &mut self.slots[rule.slot()];
        if let Some(previous) = slot.as_ref() {
            trace!(rule = rule.name(), replaced = ?previous.partial, "pending window replaced");
        }
        *slot = Some(Pending {
            partial,
            created_at: now,
            deadline,
        });
    }

    fn take_live(&mut self, rule: RuleId, now: Instant) -> Option<Partial> {
        let slot = &mut self.slots[rule.slot()];
        if slot.as_ref().is_some_and(|p| p.is_live(now)) {
            slot.take().map(|p| p.partial)
        } else {
            None
        }
    }
}
