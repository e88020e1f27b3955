#![forbid(unsafe_code)]

//! Formatting of history records into styled blocks for the output sink.

use journal_core::{ClassifiedEvent, Rgb, SpeakerColorizer, Timestamp};
use journal_filter::HistoryRecord;

use crate::markup::{bold, colored, escape, strip};

const CHANNEL_COLOR: Rgb = Rgb::new(0x80, 0x80, 0xc0);
const QUEST_COLOR: Rgb = Rgb::new(0xe8, 0xd0, 0x40);
const DANGER_COLOR: Rgb = Rgb::new(0xe0, 0x40, 0x40);
const SHRINE_COLOR: Rgb = Rgb::new(0xa0, 0x60, 0xd0);
const TIMESTAMP_COLOR: Rgb = Rgb::new(0x70, 0x70, 0x70);

/// One renderable block: inline-styled markup plus its stripped text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledBlock {
    pub markup: String,
    /// Stripped form, used for span estimation and render signatures.
    pub plain: String,
}

impl StyledBlock {
    /// Build from markup; `plain` is derived by stripping it.
    #[must_use]
    pub fn from_markup(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let plain = strip(&markup);
        Self { markup, plain }
    }
}

/// Formats `[hh:mm:ss]` from seconds since the source's origin.
#[must_use]
pub fn clock_prefix(ts: Timestamp) -> String {
    let total = ts.as_secs().max(0.0) as u64;
    let (h, m, s) = ((total / 3600) % 24, (total / 60) % 60, total % 60);
    format!("[{h:02}:{m:02}:{s:02}]")
}

/// Turns records into [`StyledBlock`]s.
#[derive(Debug, Clone, Default)]
pub struct BlockFormatter {
    colorizer: SpeakerColorizer,
    show_timestamps: bool,
}

impl BlockFormatter {
    #[must_use]
    pub fn new(show_timestamps: bool) -> Self {
        Self {
            colorizer: SpeakerColorizer::new(),
            show_timestamps,
        }
    }

    #[must_use]
    pub fn format(&self, record: &HistoryRecord) -> StyledBlock {
        let body = self.event_markup(&record.event);
        if self.show_timestamps {
            let prefix = colored(&clock_prefix(record.received_at), TIMESTAMP_COLOR);
            StyledBlock::from_markup(format!("{prefix} {body}"))
        } else {
            StyledBlock::from_markup(body)
        }
    }

    fn speaker(&self, name: &str) -> String {
        bold(&colored(name, self.colorizer.color_for(name)))
    }

    /// Markup whose stripped form equals [`ClassifiedEvent::plain_text`].
    #[must_use]
    pub fn event_markup(&self, event: &ClassifiedEvent) -> String {
        match event {
            ClassifiedEvent::Regular { speaker, text } => {
                format!("{}: {}", self.speaker(speaker), escape(text))
            }
            ClassifiedEvent::GlobalChat {
                channel,
                speaker,
                message,
            } => format!(
                "{} {}: {}",
                colored(&format!("[{channel}]"), CHANNEL_COLOR),
                self.speaker(speaker),
                escape(message)
            ),
            ClassifiedEvent::Quest { title, objective } => {
                let head = bold(&colored("Quest:", QUEST_COLOR));
                match objective {
                    Some(objective) => {
                        format!("{head} {} - {}", escape(title), escape(objective))
                    }
                    None => format!("{head} {}", escape(title)),
                }
            }
            ClassifiedEvent::DangerZone { regions } => {
                let list: Vec<String> = regions
                    .iter()
                    .map(|r| colored(&r.name, r.color))
                    .collect();
                format!("{} {}", bold(&colored("Danger:", DANGER_COLOR)), list.join(", "))
            }
            ClassifiedEvent::ShrineAlert { virtue } => {
                bold(&colored(&format!("Shrine of {virtue} under attack"), SHRINE_COLOR))
            }
            ClassifiedEvent::Other { text } => escape(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::{ColoredRegion, RawEntry};
    use journal_filter::{DedupKey, ExactKey};

    fn events() -> Vec<ClassifiedEvent> {
        vec![
            ClassifiedEvent::Regular {
                speaker: "Alice".into(),
                text: "a <b> & c".into(),
            },
            ClassifiedEvent::GlobalChat {
                channel: "Trade".into(),
                speaker: "Bob".into(),
                message: "wts".into(),
            },
            ClassifiedEvent::Quest {
                title: "Foo!".into(),
                objective: Some("Bar".into()),
            },
            ClassifiedEvent::Quest {
                title: "Bounty posted".into(),
                objective: None,
            },
            ClassifiedEvent::DangerZone {
                regions: vec![
                    ColoredRegion::new("Britain", Rgb::new(1, 2, 3)),
                    ColoredRegion::new("Yew", DANGER_COLOR),
                ],
            },
            ClassifiedEvent::ShrineAlert {
                virtue: "Honor".into(),
            },
            ClassifiedEvent::Other {
                text: "x > y".into(),
            },
        ]
    }

    #[test]
    fn stripped_markup_matches_plain_text() {
        let formatter = BlockFormatter::new(false);
        for event in events() {
            let block = StyledBlock::from_markup(formatter.event_markup(&event));
            assert_eq!(block.plain, event.plain_text(), "{event:?}");
        }
    }

    #[test]
    fn speakers_are_colored() {
        let formatter = BlockFormatter::new(false);
        let markup = formatter.event_markup(&ClassifiedEvent::Regular {
            speaker: "Alice".into(),
            text: "hi".into(),
        });
        let color = SpeakerColorizer::new().color_for("alice").to_hex();
        assert!(markup.starts_with(&format!("<b><color={color}>Alice</color></b>")));
    }

    #[test]
    fn timestamp_prefix() {
        assert_eq!(clock_prefix(Timestamp::from_secs(3725.9)), "[01:02:05]");
        assert_eq!(clock_prefix(Timestamp::from_secs(-4.0)), "[00:00:00]");

        let entry = RawEntry::builder(Timestamp::from_secs(61.0), "System", "x").build();
        let record = HistoryRecord {
            seq: 0,
            event: ClassifiedEvent::Other { text: "x".into() },
            received_at: entry.timestamp(),
            plain: "x".into(),
            dedup_key: DedupKey {
                exact: ExactKey::of(&entry),
                content: None,
            },
        };
        let block = BlockFormatter::new(true).format(&record);
        assert_eq!(block.plain, "[00:01:01] x");
    }
}
