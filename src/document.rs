//! In-memory host document over a parsed [`Score`].
//!
//! Every `<note>` element is selectable. Pitched notes are exposed as
//! [`NoteRecord`]s with their onset tick and chord; rests are exposed as
//! unpitched elements. Colors applied during an edit transaction are
//! buffered and written to the score when the transaction closes.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::model::{Note, Score, DEFAULT_STAFF_LINES, MAX_STAFF_LINES};
use crate::record::{link_chord, ColorAssignment, NoteId, NoteRecord, StaffLineId, Target};
use crate::selection::{Element, ScoreHost};
use crate::timeline;

pub struct Document {
    score: Score,
    /// Every `<note>` element, in document order
    elements: Vec<Element>,
    selected: BTreeSet<NoteId>,
    ticks_per_measure: i64,
    /// Open `start_edit` calls; nested ones join the outermost transaction
    depth: usize,
    pending: Vec<ColorAssignment>,
    opened: usize,
    closed: usize,
}

impl Document {
    pub fn new(score: Score) -> Self {
        let elements = index_elements(&score);
        let ticks_per_measure = timeline::ticks_per_measure(&score);
        Self {
            score,
            elements,
            selected: BTreeSet::new(),
            ticks_per_measure,
            depth: 0,
            pending: Vec::new(),
            opened: 0,
            closed: 0,
        }
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn into_score(self) -> Score {
        self.score
    }

    /// The `<note>` element at `id`.
    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.score
            .parts
            .get(id.part)?
            .measures
            .get(id.measure)?
            .notes
            .get(id.index)
    }

    /// Every element of the document, in document order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Replace the selection with `ids`. Unknown ids are ignored.
    pub fn select<I: IntoIterator<Item = NoteId>>(&mut self, ids: I) {
        self.selected = ids.into_iter().filter(|id| self.note(*id).is_some()).collect();
    }

    /// Select every element of the measures numbered within `numbers`, in
    /// all parts.
    pub fn select_measures(&mut self, numbers: RangeInclusive<i32>) {
        let mut ids = Vec::new();
        for (p, part) in self.score.parts.iter().enumerate() {
            for (m, measure) in part.measures.iter().enumerate() {
                if numbers.contains(&measure.number) {
                    ids.extend((0..measure.notes.len()).map(|i| NoteId::new(p, m, i)));
                }
            }
        }
        self.select(ids);
    }

    pub fn is_editing(&self) -> bool {
        self.depth > 0
    }

    /// Number of edit transactions opened so far.
    pub fn transactions_opened(&self) -> usize {
        self.opened
    }

    /// Number of edit transactions closed so far.
    pub fn transactions_closed(&self) -> usize {
        self.closed
    }

    fn commit(&mut self, assignment: &ColorAssignment) {
        let color = assignment.color.to_string();
        match assignment.target {
            Target::Note { note } => {
                if let Some(n) = self.note_mut(note) {
                    n.color = Some(color);
                }
            }
            Target::Accidental { note } => {
                if let Some(acc) = self.note_mut(note).and_then(|n| n.accidental.as_mut()) {
                    acc.color = Some(color);
                }
            }
            Target::Dot { note, index } => {
                if let Some(dot) = self.note_mut(note).and_then(|n| n.dots.get_mut(index)) {
                    dot.color = Some(color);
                }
            }
            Target::StaffLine { line } => {
                if let Some(part) = self.score.parts.get_mut(line.part) {
                    part.staff_mut(line.staff).set_line_color(line.line, color);
                }
            }
        }
    }

    fn note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.score
            .parts
            .get_mut(id.part)?
            .measures
            .get_mut(id.measure)?
            .notes
            .get_mut(id.index)
    }

    fn lines_of(&self, part: usize, staff: i32) -> impl Iterator<Item = StaffLineId> {
        let lines = self
            .score
            .parts
            .get(part)
            .and_then(|p| p.staff(staff))
            .map_or(DEFAULT_STAFF_LINES, |d| d.lines.min(MAX_STAFF_LINES));
        (1..=lines).map(move |line| StaffLineId { part, staff, line })
    }
}

impl ScoreHost for Document {
    fn selection(&self) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| self.selected.contains(&element_id(e)))
            .cloned()
            .collect()
    }

    fn select_all(&mut self) {
        self.selected = self.elements.iter().map(element_id).collect();
    }

    fn escape(&mut self) {
        self.selected.clear();
    }

    fn start_edit(&mut self) {
        self.depth += 1;
        if self.depth > 1 {
            log::debug!("nested edit joins transaction {} (depth {})", self.opened, self.depth);
            return;
        }
        self.opened += 1;
        log::debug!("edit transaction {} opened", self.opened);
    }

    fn end_edit(&mut self) {
        match self.depth {
            0 => {
                log::warn!("no edit transaction to close");
                return;
            }
            1 => {}
            _ => {
                self.depth -= 1;
                return;
            }
        }
        let pending = std::mem::take(&mut self.pending);
        for assignment in &pending {
            self.commit(assignment);
        }
        self.depth = 0;
        self.closed += 1;
        log::debug!(
            "edit transaction {} closed, {} colors applied",
            self.closed,
            pending.len()
        );
    }

    fn ticks_per_measure(&self) -> i64 {
        self.ticks_per_measure
    }

    fn staff_lines(&self) -> Vec<StaffLineId> {
        let mut staves: BTreeSet<(usize, i32)> = self
            .selected
            .iter()
            .filter_map(|id| Some((id.part, self.note(*id)?.staff.unwrap_or(1))))
            .collect();
        if staves.is_empty() {
            for (p, part) in self.score.parts.iter().enumerate() {
                staves.extend((1..=part.staff_count()).map(|s| (p, s)));
            }
        }
        staves
            .into_iter()
            .flat_map(|(part, staff)| self.lines_of(part, staff))
            .collect()
    }

    fn apply(&mut self, assignment: &ColorAssignment) {
        if !self.is_editing() {
            log::warn!("color applied outside an edit transaction: {:?}", assignment.target);
            return;
        }
        self.pending.push(*assignment);
    }
}

fn element_id(element: &Element) -> NoteId {
    match element {
        Element::Note(note) => note.id,
        Element::Unpitched(id) => *id,
    }
}

/// Build the element list: one entry per `<note>`, chords linked.
fn index_elements(score: &Score) -> Vec<Element> {
    let mut elements = Vec::new();

    for (p, part) in score.parts.iter().enumerate() {
        let ticks = timeline::note_ticks(part);

        for (m, measure) in part.measures.iter().enumerate() {
            let mut chord: Vec<NoteRecord> = Vec::new();

            for (i, note) in measure.notes.iter().enumerate() {
                let id = NoteId::new(p, m, i);
                let Some(pitch) = note.midi_pitch() else {
                    flush_chord(&mut chord, &mut elements);
                    elements.push(Element::Unpitched(id));
                    continue;
                };
                if !note.chord {
                    flush_chord(&mut chord, &mut elements);
                }
                chord.push(NoteRecord {
                    id,
                    pitch,
                    tick: ticks[m][i],
                    chord: None,
                    accidental: note.accidental.is_some(),
                    dots: vec![true; note.dots.len()],
                });
            }
            flush_chord(&mut chord, &mut elements);
        }
    }

    elements
}

fn flush_chord(chord: &mut Vec<NoteRecord>, elements: &mut Vec<Element>) {
    if chord.is_empty() {
        return;
    }
    link_chord(chord);
    elements.extend(chord.drain(..).map(Element::Note));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Accidental, Attributes, Dot, Measure, Part, StaffDetails, TimeSignature};
    use crate::palette::CYAN;
    use crate::selection::{select_working_set, EditSession};

    fn score() -> Score {
        let mut sharp = Note::pitched("F", 4, Some(1.0), 2);
        sharp.accidental = Some(Accidental {
            kind: "sharp".to_string(),
            color: None,
        });
        sharp.dots = vec![Dot::default()];
        let mut third = Note::pitched("A", 4, None, 2);
        third.chord = true;
        let mut bass = Note::pitched("D", 3, None, 4);
        bass.staff = Some(2);

        Score {
            parts: vec![Part {
                id: "P1".to_string(),
                name: "Piano".to_string(),
                measures: vec![
                    Measure {
                        number: 1,
                        implicit: false,
                        attributes: Some(Attributes {
                            divisions: Some(2),
                            time: Some(TimeSignature { beats: 2, beat_type: 4 }),
                            staves: Some(2),
                            ..Attributes::default()
                        }),
                        notes: vec![sharp, third, Note::rest(2), bass],
                    },
                    Measure {
                        number: 2,
                        implicit: false,
                        attributes: None,
                        notes: vec![Note::pitched("G", 4, None, 4)],
                    },
                ],
                staff_details: Vec::new(),
            }],
            ..Score::new()
        }
    }

    #[test]
    fn indexes_chords_and_rests() {
        let doc = Document::new(score());
        let elements = doc.elements();
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[2], Element::Unpitched(NoteId::new(0, 0, 2)));

        let Element::Note(f_sharp) = &elements[0] else {
            panic!("expected a note");
        };
        assert_eq!(f_sharp.pitch, 66);
        assert!(f_sharp.accidental);
        assert_eq!(f_sharp.dots, vec![true]);
        let chord = f_sharp.chord.as_ref().unwrap();
        assert_eq!(chord.notes.len(), 2);

        // Single notes still get a one-note chord.
        let Element::Note(g) = &elements[4] else {
            panic!("expected a note");
        };
        assert_eq!(g.chord.as_ref().unwrap().notes.len(), 1);
        assert_eq!(g.tick, 960);
        assert_eq!(doc.ticks_per_measure(), 960);
    }

    #[test]
    fn selection_follows_document_order() {
        let mut doc = Document::new(score());
        doc.select([NoteId::new(0, 1, 0), NoteId::new(0, 0, 3), NoteId::new(9, 9, 9)]);
        let ids: Vec<NoteId> = doc.selection().iter().map(element_id).collect();
        assert_eq!(ids, vec![NoteId::new(0, 0, 3), NoteId::new(0, 1, 0)]);

        doc.select_measures(2..=2);
        assert_eq!(select_working_set(&doc).len(), 1);
        doc.escape();
        assert!(doc.selection().is_empty());
        doc.select_all();
        assert_eq!(doc.selection().len(), 5);
    }

    #[test]
    fn colors_commit_when_transaction_closes() {
        let mut doc = Document::new(score());
        let id = NoteId::new(0, 0, 0);
        let plan = [
            ColorAssignment::new(Target::Note { note: id }, CYAN),
            ColorAssignment::new(Target::Accidental { note: id }, CYAN),
            ColorAssignment::new(Target::Dot { note: id, index: 0 }, CYAN),
            ColorAssignment::new(Target::Dot { note: id, index: 5 }, CYAN),
        ];

        doc.apply(&plan[0]);
        assert_eq!(doc.note(id).unwrap().color, None);

        doc.start_edit();
        for a in &plan {
            doc.apply(a);
        }
        assert_eq!(doc.note(id).unwrap().color, None);
        doc.end_edit();

        let note = doc.note(id).unwrap();
        assert_eq!(note.color.as_deref(), Some("#00ffff"));
        assert_eq!(note.accidental.as_ref().unwrap().color.as_deref(), Some("#00ffff"));
        assert_eq!(note.dots[0].color.as_deref(), Some("#00ffff"));
        assert_eq!(doc.transactions_opened(), 1);
        assert_eq!(doc.transactions_closed(), 1);
    }

    #[test]
    fn staff_lines_of_selection_or_document() {
        let mut doc = Document::new(score());
        assert_eq!(doc.staff_lines().len(), 10);

        doc.select([NoteId::new(0, 0, 3)]);
        let lines = doc.staff_lines();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.staff == 2));

        doc.start_edit();
        doc.apply(&ColorAssignment::new(Target::StaffLine { line: lines[0] }, CYAN));
        doc.end_edit();
        let staff = doc.score().parts[0].staff(2).unwrap();
        assert_eq!(staff.line_color(1), Some("#00ffff"));
    }

    #[test]
    fn nested_sessions_commit_with_the_outermost() {
        let mut doc = Document::new(score());
        let id = NoteId::new(0, 0, 0);
        {
            let mut outer = EditSession::open(&mut doc);
            {
                let mut inner = EditSession::open(&mut *outer);
                assert!(!inner.is_full_score());
                inner.apply_all(&[ColorAssignment::new(Target::Note { note: id }, CYAN)]);
            }
            assert!(outer.is_editing());
            assert_eq!(outer.note(id).unwrap().color, None);
        }
        assert!(!doc.is_editing());
        assert_eq!(doc.note(id).unwrap().color.as_deref(), Some("#00ffff"));
        assert_eq!(doc.transactions_opened(), 1);
        assert_eq!(doc.transactions_closed(), 1);
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn unbalanced_end_edit_is_ignored() {
        let mut doc = Document::new(score());
        doc.end_edit();
        assert_eq!(doc.transactions_closed(), 0);
        doc.start_edit();
        doc.end_edit();
        doc.end_edit();
        assert_eq!(doc.transactions_opened(), 1);
        assert_eq!(doc.transactions_closed(), 1);
    }

    #[test]
    fn staff_lines_never_exceed_the_maximum() {
        let mut score = score();
        score.parts[0].staff_details.push(StaffDetails {
            staff: 1,
            lines: i32::MAX,
            line_colors: Vec::new(),
        });
        let doc = Document::new(score);
        let on_first: Vec<_> = doc.staff_lines().into_iter().filter(|l| l.staff == 1).collect();
        assert_eq!(on_first.len(), MAX_STAFF_LINES as usize);
    }
}
