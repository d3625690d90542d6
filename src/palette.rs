//! Display colors and the 12-entry pitch-class palettes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// An RGB display color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, ScoreError> {
        let invalid = || ScoreError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ScoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
pub const CYAN: Color = Color::rgb(0x00, 0xff, 0xff);
pub const MAGENTA: Color = Color::rgb(0xff, 0x00, 0xff);

/// One color per pitch class, C first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub [Color; 12]);

impl Palette {
    /// Color of the pitch class of `pitch`; wraps negative values.
    pub fn color_for(&self, pitch: i32) -> Color {
        self.0[pitch_class(pitch)]
    }
}

/// `pitch mod 12`, always in `0..12`.
pub fn pitch_class(pitch: i32) -> usize {
    pitch.rem_euclid(12) as usize
}

/// Chromatic rainbow, one hue per semitone.
pub const CHROMATIC: Palette = Palette([
    Color::rgb(0xe2, 0x1c, 0x48), // C
    Color::rgb(0xf2, 0x66, 0x22), // C#/Db
    Color::rgb(0xf9, 0x9d, 0x1c), // D
    Color::rgb(0xff, 0xcc, 0x33), // D#/Eb
    Color::rgb(0xff, 0xf3, 0x2b), // E
    Color::rgb(0xbc, 0xd8, 0x5f), // F
    Color::rgb(0x62, 0xbc, 0x47), // F#/Gb
    Color::rgb(0x00, 0x9c, 0x95), // G
    Color::rgb(0x00, 0x71, 0xbb), // G#/Ab
    Color::rgb(0x5e, 0x50, 0xa1), // A
    Color::rgb(0x8d, 0x5b, 0xa6), // A#/Bb
    Color::rgb(0xcf, 0x3e, 0x96), // B
]);

/// Diatonic modes of the major scale; chromatic degrees stay black.
pub const SCALE_DEGREES: Palette = Palette([
    Color::rgb(0xb3, 0xd9, 0x4c), // I Ionian
    BLACK,
    Color::rgb(0x4a, 0x90, 0xe2), // ii Dorian
    BLACK,
    Color::rgb(0xe7, 0x4c, 0x3c), // iii Phrygian
    Color::rgb(0xf1, 0xc4, 0x0f), // IV Lydian
    BLACK,
    Color::rgb(0x00, 0xbf, 0xff), // V Mixolydian
    BLACK,
    Color::rgb(0xff, 0x6f, 0x61), // vi Aeolian
    BLACK,
    Color::rgb(0xff, 0xa5, 0x00), // vii° Locrian
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let c = Color::parse("#00FFFF").unwrap();
        assert_eq!(c, CYAN);
        assert_eq!(c.to_string(), "#00ffff");
        assert_eq!("#e21c48".parse::<Color>().unwrap(), CHROMATIC.0[0]);
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in ["00ffff", "#00fff", "#00ffzz", "#0000000", "", "#ééé"] {
            assert!(Color::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn pitch_class_wraps() {
        assert_eq!(pitch_class(0), 0);
        assert_eq!(pitch_class(127), 7);
        assert_eq!(pitch_class(-1), 11);
        assert_eq!(pitch_class(200), 8);
        assert_eq!(CHROMATIC.color_for(-12), CHROMATIC.0[0]);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&MAGENTA).unwrap();
        assert_eq!(json, "\"#ff00ff\"");
        let back: Color = serde_json::from_str("\"#FF00FF\"").unwrap();
        assert_eq!(back, MAGENTA);
        assert!(serde_json::from_str::<Color>("\"magenta\"").is_err());
    }

    #[test]
    fn palette_requires_twelve_entries() {
        let eleven: Vec<String> = CHROMATIC.0[..11].iter().map(Color::to_string).collect();
        let json = serde_json::to_string(&eleven).unwrap();
        assert!(serde_json::from_str::<Palette>(&json).is_err());
    }
}
