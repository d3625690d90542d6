//! Run configuration for the coloring passes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::palette::{self, Color, Palette};

/// Colors and reference pitch classes used by a coloring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// One color per pitch class, C first
    pub palette: Palette,
    /// Tonic of the piece; picks the staff line color
    #[serde(default)]
    pub tonic_pitch_class: i32,
    /// Root of the reference chord for scale-degree coloring
    #[serde(default)]
    pub reference_root_pitch_class: i32,
    /// Color of the lowest note of the working set
    #[serde(default = "default_lowest_color")]
    pub lowest_color: Color,
    /// Color of a chord's root
    #[serde(default = "default_root_color")]
    pub root_color: Color,
    /// Color of notes that carry no role in scale-degree coloring
    #[serde(default = "default_uncolored")]
    pub uncolored: Color,
}

fn default_lowest_color() -> Color {
    palette::CYAN
}

fn default_root_color() -> Color {
    palette::MAGENTA
}

fn default_uncolored() -> Color {
    palette::BLACK
}

impl ColorConfig {
    /// Chromatic palette in C.
    pub fn color_notes() -> Self {
        Self {
            palette: palette::CHROMATIC,
            tonic_pitch_class: 0,
            reference_root_pitch_class: 0,
            lowest_color: default_lowest_color(),
            root_color: default_root_color(),
            uncolored: default_uncolored(),
        }
    }

    /// Scale-degree palette relative to an F root.
    pub fn degree_colors() -> Self {
        Self {
            palette: palette::SCALE_DEGREES,
            tonic_pitch_class: 5,
            reference_root_pitch_class: 5,
            ..Self::color_notes()
        }
    }

    pub fn with_tonic(mut self, pitch_class: i32) -> Self {
        self.tonic_pitch_class = pitch_class;
        self
    }

    pub fn with_reference_root(mut self, pitch_class: i32) -> Self {
        self.reference_root_pitch_class = pitch_class;
        self
    }

    /// Check that both reference pitch classes are in `0..=11`.
    pub fn validate(&self) -> Result<(), ScoreError> {
        check_pitch_class("tonic_pitch_class", self.tonic_pitch_class)?;
        check_pitch_class("reference_root_pitch_class", self.reference_root_pitch_class)
    }

    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ScoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ScoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

fn check_pitch_class(name: &'static str, value: i32) -> Result<(), ScoreError> {
    if (0..12).contains(&value) {
        Ok(())
    } else {
        Err(ScoreError::InvalidPitchClass { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        ColorConfig::color_notes().validate().unwrap();
        ColorConfig::degree_colors().validate().unwrap();
        assert_ne!(
            ColorConfig::color_notes().palette,
            ColorConfig::degree_colors().palette
        );
    }

    #[test]
    fn loads_json_with_defaults() {
        let palette: Vec<String> = palette::CHROMATIC.0.iter().map(Color::to_string).collect();
        let json = format!(
            r#"{{"palette": {}, "tonic_pitch_class": 7}}"#,
            serde_json::to_string(&palette).unwrap()
        );
        let config = ColorConfig::from_json(&json).unwrap();
        assert_eq!(config.tonic_pitch_class, 7);
        assert_eq!(config.reference_root_pitch_class, 0);
        assert_eq!(config.lowest_color, palette::CYAN);
        assert_eq!(config.root_color, palette::MAGENTA);
        assert_eq!(config.uncolored, palette::BLACK);
    }

    #[test]
    fn rejects_out_of_range_pitch_class() {
        let err = ColorConfig::degree_colors()
            .with_reference_root(12)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ScoreError::InvalidPitchClass { name: "reference_root_pitch_class", value: 12 }
        ));
        assert!(ColorConfig::color_notes().with_tonic(-1).validate().is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ColorConfig::from_json(r##"{"palette": ["#000000"]}"##),
            Err(ScoreError::Config(_))
        ));
    }
}
