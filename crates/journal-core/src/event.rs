#![forbid(unsafe_code)]

//! Typed journal events.
//!
//! Every accepted entry becomes exactly one [`ClassifiedEvent`]. Payload
//! fields are fully resolved at classification time, so renderers never
//! re-parse text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// A named region with its danger color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoredRegion {
    pub name: String,
    pub color: Rgb,
}

impl ColoredRegion {
    #[must_use]
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// A classified journal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedEvent {
    /// Speech from a named speaker.
    Regular { speaker: String, text: String },
    /// Multi-party channel chat.
    GlobalChat {
        channel: String,
        speaker: String,
        message: String,
    },
    /// Quest progress, possibly coalesced from a title line and an objective line.
    Quest {
        title: String,
        objective: Option<String>,
    },
    /// Regions currently flagged as dangerous.
    DangerZone { regions: Vec<ColoredRegion> },
    /// A shrine of the named virtue needs defending.
    ShrineAlert { virtue: String },
    /// Anything else worth showing.
    Other { text: String },
}

/// Payload-free tag of a [`ClassifiedEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Regular,
    GlobalChat,
    Quest,
    DangerZone,
    ShrineAlert,
    Other,
}

impl EventKind {
    /// Visibility key used by `category_visibility`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::GlobalChat => "global_chat",
            Self::Quest => "quest",
            Self::DangerZone => "danger_zone",
            Self::ShrineAlert => "shrine_alert",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl ClassifiedEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Regular { .. } => EventKind::Regular,
            Self::GlobalChat { .. } => EventKind::GlobalChat,
            Self::Quest { .. } => EventKind::Quest,
            Self::DangerZone { .. } => EventKind::DangerZone,
            Self::ShrineAlert { .. } => EventKind::ShrineAlert,
            Self::Other { .. } => EventKind::Other,
        }
    }

    /// Unstyled one-line rendering, used for content dedup and width estimates.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Regular { speaker, text } => format!("{speaker}: {text}"),
            Self::GlobalChat {
                channel,
                speaker,
                message,
            } => format!("[{channel}] {speaker}: {message}"),
            Self::Quest {
                title,
                objective: Some(objective),
            } => format!("Quest: {title} - {objective}"),
            Self::Quest {
                title,
                objective: None,
            } => format!("Quest: {title}"),
            Self::DangerZone { regions } => {
                let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
                format!("Danger: {}", names.join(", "))
            }
            Self::ShrineAlert { virtue } => format!("Shrine of {virtue} under attack"),
            Self::Other { text } => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let event = ClassifiedEvent::ShrineAlert {
            virtue: "Honor".into(),
        };
        assert_eq!(event.kind(), EventKind::ShrineAlert);
        assert_eq!(event.kind().to_string(), "shrine_alert");
    }

    #[test]
    fn plain_text_for_quest() {
        let quest = ClassifiedEvent::Quest {
            title: "Foo!".into(),
            objective: Some("Bar".into()),
        };
        assert_eq!(quest.plain_text(), "Quest: Foo! - Bar");
    }

    #[test]
    fn plain_text_for_regions() {
        let event = ClassifiedEvent::DangerZone {
            regions: vec![
                ColoredRegion::new("Britain", Rgb::new(255, 0, 0)),
                ColoredRegion::new("Yew", Rgb::new(0, 255, 0)),
            ],
        };
        assert_eq!(event.plain_text(), "Danger: Britain, Yew");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let event = ClassifiedEvent::Other { text: "hi".into() };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"other","text":"hi"}"#);
    }
}
