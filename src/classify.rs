//! Note roles: the lowest note of a collection and the root of a chord.
//!
//! The chord root is the chord's lowest-pitched member. This is a
//! bass-note heuristic, not inversion-aware harmonic analysis.

use crate::record::{ChordRecord, NoteId, NoteRecord};

/// Role of a note when coloring by pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchRole {
    /// Lowest note of the whole working set
    Lowest,
    /// Root of its own chord
    Root,
    Default,
}

/// Role of a note when coloring by scale degree within a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeRole {
    /// Root of the bar's reference chord
    Root,
    /// Lowest note of the bar, when it is not the root
    LowestNonRoot,
    Default,
}

/// Lowest note by pitch; ties keep the first one encountered.
pub fn lowest_note<'a, I>(notes: I) -> Option<&'a NoteRecord>
where
    I: IntoIterator<Item = &'a NoteRecord>,
{
    notes.into_iter().reduce(|lowest, current| {
        if current.pitch < lowest.pitch {
            current
        } else {
            lowest
        }
    })
}

/// Root of a chord, `None` for a missing or empty chord.
pub fn chord_root(chord: Option<&ChordRecord>) -> Option<NoteId> {
    chord?
        .notes
        .iter()
        .reduce(|root, current| if current.pitch < root.pitch { current } else { root })
        .map(|m| m.id)
}

/// Root of the chord `note` belongs to.
pub fn root_of(note: &NoteRecord) -> Option<NoteId> {
    chord_root(note.chord.as_deref())
}

/// Lowest-note override first, then chord root, else pitch class.
pub fn pitch_role(note: &NoteRecord, lowest: NoteId) -> PitchRole {
    if note.id == lowest {
        PitchRole::Lowest
    } else if root_of(note) == Some(note.id) {
        PitchRole::Root
    } else {
        PitchRole::Default
    }
}

/// Per-bar reference notes for scale-degree coloring.
#[derive(Debug, Clone, PartialEq)]
pub struct BarContext<'a> {
    pub lowest: &'a NoteRecord,
    /// Root of the chord of the bar's first note; later chords in the bar
    /// are not consulted
    pub root: Option<NoteId>,
}

impl<'a> BarContext<'a> {
    /// `None` for an empty bar.
    pub fn new(bar: &[&'a NoteRecord]) -> Option<Self> {
        let first = bar.first()?;
        Some(Self {
            lowest: lowest_note(bar.iter().copied())?,
            root: root_of(first),
        })
    }

    pub fn role(&self, note: &NoteRecord) -> DegreeRole {
        if self.root == Some(note.id) {
            DegreeRole::Root
        } else if note.id == self.lowest.id && self.root != Some(self.lowest.id) {
            DegreeRole::LowestNonRoot
        } else {
            DegreeRole::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{link_chord, ChordMember};

    fn note(index: usize, pitch: i32) -> NoteRecord {
        NoteRecord::new(NoteId::new(0, 0, index), pitch, 0)
    }

    #[test]
    fn lowest_note_keeps_first_tie() {
        let notes = vec![note(0, 64), note(1, 60), note(2, 60), note(3, 72)];
        assert_eq!(lowest_note(&notes).map(|n| n.id.index), Some(1));
        assert_eq!(lowest_note(&Vec::<NoteRecord>::new()), None);
    }

    #[test]
    fn chord_root_is_lowest_member() {
        let chord = ChordRecord {
            notes: vec![
                ChordMember { id: NoteId::new(0, 0, 0), pitch: 67 },
                ChordMember { id: NoteId::new(0, 0, 1), pitch: 55 },
                ChordMember { id: NoteId::new(0, 0, 2), pitch: 55 },
            ],
        };
        assert_eq!(chord_root(Some(&chord)), Some(NoteId::new(0, 0, 1)));
    }

    #[test]
    fn missing_or_empty_chord_has_no_root() {
        assert_eq!(chord_root(None), None);
        assert_eq!(chord_root(Some(&ChordRecord::default())), None);
    }

    #[test]
    fn pitch_roles() {
        let mut notes = vec![note(0, 48), note(1, 64), note(2, 67), note(3, 71)];
        link_chord(&mut notes[1..3]);
        let lowest = lowest_note(&notes).unwrap().id;

        let roles: Vec<_> = notes.iter().map(|n| pitch_role(n, lowest)).collect();
        assert_eq!(
            roles,
            [PitchRole::Lowest, PitchRole::Root, PitchRole::Default, PitchRole::Default]
        );
    }

    #[test]
    fn bar_root_comes_from_first_note_only() {
        // First chord F-A, then a later chord C-E in the same bar.
        let mut notes = vec![note(0, 65), note(1, 69), note(2, 60), note(3, 64)];
        link_chord(&mut notes[0..2]);
        link_chord(&mut notes[2..4]);
        let bar: Vec<&NoteRecord> = notes.iter().collect();
        let ctx = BarContext::new(&bar).unwrap();

        assert_eq!(ctx.root, Some(notes[0].id));
        assert_eq!(ctx.lowest.id, notes[2].id);
        assert_eq!(ctx.role(&notes[0]), DegreeRole::Root);
        assert_eq!(ctx.role(&notes[1]), DegreeRole::Default);
        assert_eq!(ctx.role(&notes[2]), DegreeRole::LowestNonRoot);
        // The second chord's own root is not recognised.
        assert_eq!(ctx.role(&notes[3]), DegreeRole::Default);
    }

    #[test]
    fn lowest_that_is_root_is_only_root() {
        let mut notes = vec![note(0, 53), note(1, 57)];
        link_chord(&mut notes);
        let bar: Vec<&NoteRecord> = notes.iter().collect();
        let ctx = BarContext::new(&bar).unwrap();
        assert_eq!(ctx.role(&notes[0]), DegreeRole::Root);
        assert_eq!(ctx.role(&notes[1]), DegreeRole::Default);
    }

    #[test]
    fn empty_bar_has_no_context() {
        assert_eq!(BarContext::new(&[]), None);
    }
}
