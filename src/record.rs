//! Note records consumed by the coloring engine and the color
//! assignments it produces.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::palette::Color;

/// Address of a `<note>` element: part, measure and position in the measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId {
    pub part: usize,
    pub measure: usize,
    pub index: usize,
}

impl NoteId {
    pub const fn new(part: usize, measure: usize, index: usize) -> Self {
        Self { part, measure, index }
    }
}

/// One member of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordMember {
    pub id: NoteId,
    pub pitch: i32,
}

/// Notes sounding together on one stem. Member order carries no meaning
/// except for breaking pitch ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordRecord {
    pub notes: Vec<ChordMember>,
}

/// A pitched note in the working set.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    pub id: NoteId,
    /// MIDI-like pitch (C4 = 60)
    pub pitch: i32,
    /// Absolute onset tick
    pub tick: i64,
    /// The chord this note belongs to, shared between its members
    pub chord: Option<Rc<ChordRecord>>,
    /// Whether an accidental glyph is printed
    pub accidental: bool,
    /// Augmentation dot slots; `false` marks an absent glyph
    pub dots: Vec<bool>,
}

impl NoteRecord {
    /// A bare note with no chord, accidental or dots.
    pub fn new(id: NoteId, pitch: i32, tick: i64) -> Self {
        Self {
            id,
            pitch,
            tick,
            chord: None,
            accidental: false,
            dots: Vec::new(),
        }
    }
}

/// A staff line: 1-based `line` on 1-based `staff` of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffLineId {
    pub part: usize,
    pub staff: i32,
    pub line: i32,
}

/// Something that can be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Note { note: NoteId },
    Accidental { note: NoteId },
    Dot { note: NoteId, index: usize },
    StaffLine { line: StaffLineId },
}

/// A color to apply to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAssignment {
    pub target: Target,
    pub color: Color,
}

impl ColorAssignment {
    pub fn new(target: Target, color: Color) -> Self {
        Self { target, color }
    }
}

/// Put `notes` into one shared chord and attach it to each of them.
pub fn link_chord(notes: &mut [NoteRecord]) -> Rc<ChordRecord> {
    let chord = Rc::new(ChordRecord {
        notes: notes
            .iter()
            .map(|n| ChordMember { id: n.id, pitch: n.pitch })
            .collect(),
    });
    for note in notes.iter_mut() {
        note.chord = Some(Rc::clone(&chord));
    }
    chord
}
