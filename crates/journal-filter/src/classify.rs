#![forbid(unsafe_code)]

//! Classification of filtered entries into typed events.
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. channel chat (`<Trade> Alice : hi`, `[Trade Chat] Alice: hi`)
//! 2. the ordered [`RULES`] list: coalescing markers, lists, triggers,
//!    details, and self-contained alerts
//! 3. speech from a named speaker
//! 4. whole-word quest / alert keywords, otherwise `Other`
//!
//! Visibility toggles are applied to the produced event, never to the
//! coalescing halves, so a hidden category still consumes its pending state.

use std::sync::{Arc, LazyLock};
use std::time::Instant;

use journal_core::{
    ClassifiedEvent, ColoredRegion, EventKind, JournalConfig, RawEntry, Rgb,
};
use regex::{Captures, Regex};
use tracing::trace;

use crate::coalesce::{EventCoalescer, Paired, RuleId};
use crate::outcome::{Classification, DropReason};

/// Color for regions listed without one.
pub const DEFAULT_DANGER_COLOR: Rgb = Rgb::new(0xe0, 0x40, 0x40);

/// What a matching rule does with its captures.
#[derive(Debug, Clone, Copy)]
pub enum RuleAction {
    /// Arm the rule's slot without a payload.
    Marker(RuleId),
    /// A region list; `needs_marker` lists only count right after a marker.
    List { rule: RuleId, needs_marker: bool },
    /// First half of a pair; the `payload` group is kept.
    Trigger(RuleId),
    /// Second half of a pair; the `payload` group is kept.
    Detail(RuleId),
    /// Complete on its own.
    Standalone(fn(&Captures<'_>) -> ClassifiedEvent),
}

/// One `(pattern, action)` entry in the ordered rule list.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub action: RuleAction,
}

impl Rule {
    fn builtin(name: &'static str, pattern: &str, action: RuleAction) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("built-in rule pattern is valid"),
            action,
        }
    }
}

/// Built-in rules, most specific first.
pub static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::builtin(
            "danger_marker",
            r"(?i)^\s*(?:danger zone update|dangerous regions\s*:)\s*$",
            RuleAction::Marker(RuleId::DangerZone),
        ),
        Rule::builtin(
            "danger_list",
            r"(?i)^\s*(?:regions|danger zones?)\s*:\s*(?P<payload>\S.*?)\s*$",
            RuleAction::List {
                rule: RuleId::DangerZone,
                needs_marker: false,
            },
        ),
        Rule::builtin(
            "danger_bare_list",
            r"^\s*(?P<payload>[A-Z][A-Za-z' ]*(?:\s*[\[(]#?\w+[\])])?(?:\s*,\s*[A-Z][A-Za-z' ]*(?:\s*[\[(]#?\w+[\])])?)*)\s*$",
            RuleAction::List {
                rule: RuleId::DangerZone,
                needs_marker: true,
            },
        ),
        Rule::builtin(
            "quest_trigger",
            r"(?i)^\s*a new quest has begun\s*:\s*(?P<payload>.+?)\s*$",
            RuleAction::Trigger(RuleId::Quest),
        ),
        Rule::builtin(
            "quest_detail",
            r"(?i)^\s*objective\s*:\s*(?P<payload>.+?)(?:\s*\(\s*target\s*:\s*[\d,]+\s*\))?\s*$",
            RuleAction::Detail(RuleId::Quest),
        ),
        Rule::builtin(
            "shrine_attack",
            r"(?i)^\s*the shrine of (?P<virtue>[a-z]+) is under attack!?\s*$",
            RuleAction::Standalone(shrine_alert),
        ),
        Rule::builtin(
            "shrine_desecrated",
            r"(?i)^\s*(?:the )?(?P<virtue>[a-z]+) shrine is being desecrated!?\s*$",
            RuleAction::Standalone(shrine_alert),
        ),
    ]
});

static CHANNEL_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<(?P<channel>[^<>]{1,32})>\s*(?P<speaker>[^:<>]+?)\s*:\s*(?P<message>.*?)\s*$")
        .expect("channel pattern is valid")
});

static CHANNEL_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\[(?P<channel>[^\[\]]{1,32}?)\s+chat\]\s*(?P<speaker>[^:]+?)\s*:\s*(?P<message>.*?)\s*$")
        .expect("labeled channel pattern is valid")
});

static QUEST_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:quests?|objectives?|bounty)\b").expect("quest keyword pattern is valid")
});

static ALERT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:champion spawn|invasion|town (?:is )?under attack)\b")
        .expect("alert keyword pattern is valid")
});

static REGION_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<name>[^\[\]()]+?)\s*(?:[\[(]\s*(?P<color>#?\w+)\s*[\])])?\s*$")
        .expect("region item pattern is valid")
});

fn shrine_alert(caps: &Captures<'_>) -> ClassifiedEvent {
    ClassifiedEvent::ShrineAlert {
        virtue: capitalize(&caps["virtue"]),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parse `Britain [red], Yew (orange), Minoc` into colored regions.
#[must_use]
pub fn parse_regions(list: &str) -> Vec<ColoredRegion> {
    list.split(',')
        .filter_map(|item| {
            let caps = REGION_ITEM.captures(item)?;
            let name = caps.name("name")?.as_str().trim();
            if name.is_empty() {
                return None;
            }
            let color = caps
                .name("color")
                .and_then(|c| Rgb::parse(c.as_str()))
                .unwrap_or(DEFAULT_DANGER_COLOR);
            Some(ColoredRegion::new(name, color))
        })
        .collect()
}

/// A parsed channel chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelChat {
    pub channel: String,
    pub speaker: String,
    pub message: String,
}

/// Recognize either channel chat form.
#[must_use]
pub fn parse_channel_chat(text: &str) -> Option<ChannelChat> {
    let caps = CHANNEL_BRACKET
        .captures(text)
        .or_else(|| CHANNEL_LABELED.captures(text))?;
    let channel = caps["channel"].trim();
    let speaker = caps["speaker"].trim();
    if channel.is_empty() || speaker.is_empty() {
        return None;
    }
    Some(ChannelChat {
        channel: channel.to_string(),
        speaker: speaker.to_string(),
        message: caps["message"].to_string(),
    })
}

/// Turns filtered entries into events, owning the coalescing state.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: Arc<JournalConfig>,
    coalescer: EventCoalescer,
}

impl Classifier {
    #[must_use]
    pub fn new(config: Arc<JournalConfig>) -> Self {
        let coalescer = EventCoalescer::new(config.pending_window());
        Self { config, coalescer }
    }

    /// The ordered rule list consulted after channel parsing.
    #[must_use]
    pub fn rules() -> &'static [Rule] {
        &RULES
    }

    #[must_use]
    pub fn coalescer(&self) -> &EventCoalescer {
        &self.coalescer
    }

    /// Expire stale pending windows; run once per tick before classifying.
    pub fn expire_if_past(&mut self, now: Instant) -> Vec<RuleId> {
        self.coalescer.expire_if_past(now)
    }

    /// Discard all coalescing state.
    pub fn reset(&mut self) {
        self.coalescer.clear();
    }

    /// Classify one entry that passed the noise filters.
    pub fn classify(&mut self, entry: &RawEntry, now: Instant) -> Classification {
        let text = entry.text().trim();

        if let Some(chat) = parse_channel_chat(text) {
            self.contaminate_markers(None);
            return self.gate_channel(chat);
        }

        // Player speech never drives the rule table, only non-speech lines do.
        let category = entry.category();
        let speech = category.is_speech() && entry.speaker().is_some();
        let rules: &[Rule] = if speech { &[] } else { Self::rules() };

        for rule in rules {
            let Some(caps) = rule.pattern.captures(text) else {
                continue;
            };
            match rule.action {
                RuleAction::Marker(id) => {
                    trace!(rule = rule.name, "marker armed");
                    self.contaminate_markers(Some(id));
                    self.coalescer.on_marker(id, now);
                    return Classification::Pending(id);
                }
                RuleAction::List { rule: id, needs_marker } => {
                    let regions = parse_regions(&caps["payload"]);
                    if regions.is_empty() {
                        continue;
                    }
                    let had_marker = self.coalescer.take_marker(id, now);
                    if needs_marker && !had_marker {
                        continue;
                    }
                    trace!(rule = rule.name, count = regions.len(), had_marker, "region list");
                    self.contaminate_markers(Some(id));
                    return self.gate(ClassifiedEvent::DangerZone { regions });
                }
                RuleAction::Trigger(id) => {
                    self.contaminate_markers(None);
                    let payload = caps["payload"].to_string();
                    return match self.coalescer.on_trigger(id, payload, now) {
                        Some(paired) => self.gate(compose(id, paired)),
                        None => Classification::Pending(id),
                    };
                }
                RuleAction::Detail(id) => {
                    self.contaminate_markers(None);
                    let payload = caps["payload"].to_string();
                    return match self.coalescer.on_detail(id, payload, now) {
                        Some(paired) => self.gate(compose(id, paired)),
                        None => Classification::Pending(id),
                    };
                }
                RuleAction::Standalone(build) => {
                    self.contaminate_markers(None);
                    return self.gate(build(&caps));
                }
            }
        }

        self.contaminate_markers(None);

        if speech
            && let Some(speaker) = entry.speaker()
        {
            if !self.config.is_category_visible(category.key()) {
                return Classification::Dropped(DropReason::Hidden(EventKind::Regular));
            }
            return self.gate(ClassifiedEvent::Regular {
                speaker: speaker.to_string(),
                text: text.to_string(),
            });
        }

        if QUEST_KEYWORD.is_match(text) || ALERT_KEYWORD.is_match(text) {
            return self.gate(ClassifiedEvent::Quest {
                title: text.to_string(),
                objective: None,
            });
        }

        if self.config.is_category_visible(EventKind::Other.key()) {
            Classification::Event(ClassifiedEvent::Other {
                text: text.to_string(),
            })
        } else {
            Classification::Dropped(DropReason::Unclassified)
        }
    }

    /// Any classified line other than a rule's own marker or list breaks
    /// marker adjacency for that rule.
    fn contaminate_markers(&mut self, except: Option<RuleId>) {
        for rule in RuleId::ALL {
            if Some(rule) != except {
                self.coalescer.note_unrelated(rule);
            }
        }
    }

    fn gate_channel(&self, chat: ChannelChat) -> Classification {
        if !self.config.is_channel_visible(&chat.channel) {
            return Classification::Dropped(DropReason::ChannelHidden(chat.channel));
        }
        self.gate(ClassifiedEvent::GlobalChat {
            channel: chat.channel,
            speaker: chat.speaker,
            message: chat.message,
        })
    }

    fn gate(&self, event: ClassifiedEvent) -> Classification {
        let kind = event.kind();
        if self.config.is_category_visible(kind.key()) {
            Classification::Event(event)
        } else {
            Classification::Dropped(DropReason::Hidden(kind))
        }
    }
}

fn compose(rule: RuleId, paired: Paired) -> ClassifiedEvent {
    match rule {
        RuleId::Quest => ClassifiedEvent::Quest {
            title: paired.trigger,
            objective: Some(paired.detail),
        },
        RuleId::DangerZone => ClassifiedEvent::DangerZone {
            regions: parse_regions(&paired.detail),
        },
    }
}
