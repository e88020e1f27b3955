//! Colors and the deterministic speaker palette.

use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form used in inline style markers.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb`, `rrggbb`, or a small set of color names.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }
        named_color(value)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "red" => Rgb::new(0xe0, 0x40, 0x40),
        "orange" => Rgb::new(0xf0, 0x90, 0x30),
        "yellow" => Rgb::new(0xe8, 0xd0, 0x40),
        "green" => Rgb::new(0x50, 0xc0, 0x50),
        "blue" => Rgb::new(0x50, 0x80, 0xe0),
        "purple" => Rgb::new(0xa0, 0x60, 0xd0),
        "white" => Rgb::new(0xf0, 0xf0, 0xf0),
        "gray" | "grey" => Rgb::new(0x90, 0x90, 0x90),
        _ => return None,
    };
    Some(rgb)
}

/// Color used for system lines and nameless speakers.
pub const NEUTRAL: Rgb = Rgb::new(0xb0, 0xb0, 0xb0);

/// Palette chosen to stay readable on a dark background.
const SPEAKER_PALETTE: [Rgb; 12] = [
    Rgb::new(0x5f, 0xaf, 0xff),
    Rgb::new(0xff, 0x87, 0x5f),
    Rgb::new(0x87, 0xd7, 0x5f),
    Rgb::new(0xd7, 0x87, 0xff),
    Rgb::new(0xff, 0xd7, 0x5f),
    Rgb::new(0x5f, 0xd7, 0xd7),
    Rgb::new(0xff, 0x5f, 0x87),
    Rgb::new(0xaf, 0xaf, 0xff),
    Rgb::new(0xd7, 0xaf, 0x87),
    Rgb::new(0x87, 0xff, 0xaf),
    Rgb::new(0xff, 0xaf, 0xd7),
    Rgb::new(0xaf, 0xd7, 0x00),
];

/// Deterministic speaker name to color mapping.
///
/// The same name (ignoring ASCII case and surrounding whitespace) always
/// maps to the same palette entry, across runs and processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerColorizer;

impl SpeakerColorizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn color_for(&self, speaker: &str) -> Rgb {
        let name = speaker.trim();
        if name.is_empty() {
            return NEUTRAL;
        }
        let mut hasher = FxHasher::default();
        for byte in name.bytes() {
            hasher.write_u8(byte.to_ascii_lowercase());
        }
        let idx = (hasher.finish() % SPEAKER_PALETTE.len() as u64) as usize;
        SPEAKER_PALETTE[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Rgb::parse("#1a2B3c").unwrap();
        assert_eq!(c, Rgb::new(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_hex(), "#1a2b3c");
    }

    #[test]
    fn named_colors_parse() {
        assert_eq!(Rgb::parse("Orange"), Some(Rgb::new(0xf0, 0x90, 0x30)));
        assert_eq!(Rgb::parse("chartreuse"), None);
        assert_eq!(Rgb::parse("#12345"), None);
    }

    #[test]
    fn colorizer_is_deterministic_and_case_insensitive() {
        let c = SpeakerColorizer::new();
        assert_eq!(c.color_for("Alice"), c.color_for("alice"));
        assert_eq!(c.color_for(" Alice "), c.color_for("ALICE"));
        assert_eq!(c.color_for("Alice"), SpeakerColorizer.color_for("Alice"));
    }

    #[test]
    fn empty_speaker_is_neutral() {
        assert_eq!(SpeakerColorizer::new().color_for("  "), NEUTRAL);
    }

    #[test]
    fn colors_come_from_palette() {
        let c = SpeakerColorizer::new();
        for name in ["Alice", "Bob", "Lord British", "Mondain", "x"] {
            assert!(SPEAKER_PALETTE.contains(&c.color_for(name)));
        }
    }
}
