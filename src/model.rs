//! Data model for representing a parsed MusicXML score.
//!
//! Only the information the coloring passes read or write is kept:
//! pitch, rhythm (for onset ticks), chord membership, the glyphs that
//! follow a note's color (accidental, augmentation dots), and staff lines.

use serde::{Deserialize, Serialize};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Musical parts (instruments)
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Classical Guitar")
    pub name: String,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
    /// Staff line details, one entry per staff that declared or received them
    pub staff_details: Vec<StaffDetails>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number
    pub number: i32,
    /// Whether this is an implicit measure (e.g., pickup/anacrusis)
    pub implicit: bool,
    /// Attributes (divisions, time, staves), only present when they change
    pub attributes: Option<Attributes>,
    /// Notes and rests in this measure, in document order
    pub notes: Vec<Note>,
}

/// Musical attributes that may change at the start of a measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Divisions per quarter note (determines duration resolution)
    pub divisions: Option<i32>,
    /// Time signature
    pub time: Option<TimeSignature>,
    /// Number of staves in this part (e.g. 2 for piano grand staff)
    pub staves: Option<i32>,
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
}

/// Line layout of one staff (`<staff-details>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffDetails {
    /// Staff number (1-based)
    pub staff: i32,
    /// Number of lines on the staff
    pub lines: i32,
    /// Per-line colors, indexed by line number - 1
    pub line_colors: Vec<Option<String>>,
}

/// A single note or rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Pitch (None if this is a rest)
    pub pitch: Option<Pitch>,
    /// Duration in divisions
    pub duration: i32,
    /// Voice number (for multi-voice writing)
    pub voice: Option<i32>,
    /// Staff number (1-based; for multi-staff parts like piano)
    pub staff: Option<i32>,
    /// Whether this is a rest
    pub rest: bool,
    /// Whether this note is part of a chord with the previous note
    pub chord: bool,
    /// Whether this is a grace note (takes no time)
    pub grace: bool,
    /// Accidental glyph, if one is printed
    pub accidental: Option<Accidental>,
    /// Augmentation dots, in document order
    pub dots: Vec<Dot>,
    /// Display color of the notehead (`#rrggbb`)
    pub color: Option<String>,
}

/// Pitch of a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitch {
    /// Note name: A, B, C, D, E, F, G
    pub step: String,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration: -1.0 = flat, 1.0 = sharp, 0.0 = natural
    pub alter: Option<f64>,
}

/// A printed accidental.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accidental {
    /// "sharp", "flat", "natural", "double-sharp", "flat-flat"
    pub kind: String,
    pub color: Option<String>,
}

/// An augmentation dot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dot {
    pub color: Option<String>,
}

/// Staff line count when `<staff-details>` does not say otherwise.
pub const DEFAULT_STAFF_LINES: i32 = 5;

/// Most lines a staff can have; larger `<staff-lines>` counts are clamped.
pub const MAX_STAFF_LINES: i32 = 14;

/// Octaves outside this range are clamped when computing MIDI pitch.
const OCTAVE_RANGE: (i32, i32) = (-1, 9);

/// Largest alteration in semitones, either direction.
const MAX_ALTER: f64 = 2.0;

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self {
            title: None,
            composer: None,
            version: None,
            parts: Vec::new(),
        }
    }

    /// The first time signature declared anywhere in the score.
    pub fn first_time_signature(&self) -> Option<TimeSignature> {
        self.parts
            .iter()
            .flat_map(|p| &p.measures)
            .filter_map(|m| m.attributes.as_ref().and_then(|a| a.time))
            .next()
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Part {
    /// Number of staves in this part (largest `<staves>` or staff number seen).
    pub fn staff_count(&self) -> i32 {
        let mut count = 1;
        for measure in &self.measures {
            if let Some(staves) = measure.attributes.as_ref().and_then(|a| a.staves) {
                count = count.max(staves);
            }
            for note in &measure.notes {
                count = count.max(note.staff.unwrap_or(1));
            }
        }
        for details in &self.staff_details {
            count = count.max(details.staff);
        }
        count
    }

    /// Staff details for `staff`, if the part declared any.
    pub fn staff(&self, staff: i32) -> Option<&StaffDetails> {
        self.staff_details.iter().find(|d| d.staff == staff)
    }

    /// Staff details for `staff`, created with default lines when missing.
    pub fn staff_mut(&mut self, staff: i32) -> &mut StaffDetails {
        let pos = match self.staff_details.iter().position(|d| d.staff == staff) {
            Some(pos) => pos,
            None => {
                self.staff_details.push(StaffDetails::new(staff, DEFAULT_STAFF_LINES));
                self.staff_details.len() - 1
            }
        };
        &mut self.staff_details[pos]
    }
}

impl StaffDetails {
    /// Lines are clamped to `0..=MAX_STAFF_LINES`.
    pub fn new(staff: i32, lines: i32) -> Self {
        let lines = lines.clamp(0, MAX_STAFF_LINES);
        Self {
            staff,
            lines,
            line_colors: vec![None; lines as usize],
        }
    }

    /// Color of `line` (1-based), if one was set.
    pub fn line_color(&self, line: i32) -> Option<&str> {
        let idx = usize::try_from(line - 1).ok()?;
        self.line_colors.get(idx)?.as_deref()
    }

    /// Set the color of `line` (1-based). Out-of-range lines are ignored.
    pub fn set_line_color(&mut self, line: i32, color: String) {
        let lines = self.lines.min(MAX_STAFF_LINES);
        if line < 1 || line > lines {
            return;
        }
        let idx = (line - 1) as usize;
        if self.line_colors.len() < lines as usize {
            self.line_colors.resize(lines as usize, None);
        }
        self.line_colors[idx] = Some(color);
    }
}

impl Note {
    /// A pitched note, for building scores programmatically.
    pub fn pitched(step: &str, octave: i32, alter: Option<f64>, duration: i32) -> Self {
        Self {
            pitch: Some(Pitch {
                step: step.to_string(),
                octave,
                alter,
            }),
            rest: false,
            ..Self::rest(duration)
        }
    }

    /// A rest of `duration` divisions.
    pub fn rest(duration: i32) -> Self {
        Self {
            pitch: None,
            duration,
            voice: None,
            staff: None,
            rest: true,
            chord: false,
            grace: false,
            accidental: None,
            dots: Vec::new(),
            color: None,
        }
    }

    /// MIDI pitch of the note, `None` for rests.
    pub fn midi_pitch(&self) -> Option<i32> {
        if self.rest {
            return None;
        }
        self.pitch.as_ref().map(Pitch::to_midi)
    }
}

impl Pitch {
    /// Convert pitch to MIDI note number.
    /// Middle C (C4) = 60. Out-of-range octaves and alterations are clamped,
    /// so the result always lies in `-2..=133`.
    pub fn to_midi(&self) -> i32 {
        let step_semitone = match self.step.as_str() {
            "C" => 0,
            "D" => 2,
            "E" => 4,
            "F" => 5,
            "G" => 7,
            "A" => 9,
            "B" => 11,
            _ => 0,
        };
        let alter = self.alter.unwrap_or(0.0).clamp(-MAX_ALTER, MAX_ALTER) as i32;
        let octave = self.octave.clamp(OCTAVE_RANGE.0, OCTAVE_RANGE.1);
        (octave + 1) * 12 + step_semitone + alter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi_numbers() {
        assert_eq!(Note::pitched("C", 4, None, 1).midi_pitch(), Some(60));
        assert_eq!(Note::pitched("F", 4, Some(1.0), 1).midi_pitch(), Some(66));
        assert_eq!(Note::pitched("B", 3, Some(-1.0), 1).midi_pitch(), Some(58));
        assert_eq!(Note::rest(1).midi_pitch(), None);
    }

    #[test]
    fn extreme_pitches_are_clamped() {
        let high = Note::pitched("B", 999_999_999, Some(1e12), 1);
        assert_eq!(high.midi_pitch(), Some(10 * 12 + 11 + 2));
        let low = Note::pitched("C", i32::MIN, Some(f64::NEG_INFINITY), 1);
        assert_eq!(low.midi_pitch(), Some(-2));
        let nan = Note::pitched("D", 4, Some(f64::NAN), 1);
        assert_eq!(nan.midi_pitch(), Some(62));
    }

    #[test]
    fn staff_line_count_is_clamped() {
        assert_eq!(StaffDetails::new(1, 2_000_000).lines, MAX_STAFF_LINES);
        assert_eq!(StaffDetails::new(1, i32::MAX).line_colors.len(), MAX_STAFF_LINES as usize);
        assert_eq!(StaffDetails::new(1, -3).lines, 0);
    }

    #[test]
    fn staff_line_colors_are_bounded() {
        let mut details = StaffDetails::new(1, 5);
        details.set_line_color(3, "#e21c48".to_string());
        details.set_line_color(0, "#000000".to_string());
        details.set_line_color(6, "#000000".to_string());
        assert_eq!(details.line_color(3), Some("#e21c48"));
        assert_eq!(details.line_color(1), None);
        assert_eq!(details.line_color(6), None);
    }

    #[test]
    fn staff_count_uses_staves_and_note_staff() {
        let mut part = Part {
            id: "P1".to_string(),
            name: String::new(),
            measures: vec![Measure {
                number: 1,
                implicit: false,
                attributes: None,
                notes: vec![Note::pitched("C", 4, None, 1)],
            }],
            staff_details: Vec::new(),
        };
        assert_eq!(part.staff_count(), 1);
        part.measures[0].notes[0].staff = Some(2);
        assert_eq!(part.staff_count(), 2);
        part.staff_mut(3);
        assert_eq!(part.staff_count(), 3);
        assert_eq!(part.staff(3).map(|d| d.lines), Some(DEFAULT_STAFF_LINES));
    }
}
