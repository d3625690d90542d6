//! The host document interface and the scoped edit session every coloring
//! run executes in.

use std::ops::{Deref, DerefMut};

use crate::record::{ColorAssignment, NoteId, NoteRecord, StaffLineId};

/// A selected element of the host document.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A pitched note
    Note(NoteRecord),
    /// A rest, or any other element without a pitch
    Unpitched(NoteId),
}

impl Element {
    pub fn pitch(&self) -> Option<i32> {
        match self {
            Element::Note(note) => Some(note.pitch),
            Element::Unpitched(_) => None,
        }
    }
}

/// What a coloring run needs from the document it runs against.
pub trait ScoreHost {
    /// Currently selected elements, in document order.
    fn selection(&self) -> Vec<Element>;

    /// Select every element of the document.
    fn select_all(&mut self);

    /// Drop the selection.
    fn escape(&mut self);

    /// Open an edit transaction.
    fn start_edit(&mut self);

    /// Close the edit transaction opened by [`ScoreHost::start_edit`].
    fn end_edit(&mut self);

    /// Length of one measure in ticks.
    fn ticks_per_measure(&self) -> i64;

    /// Staff lines of the selection, or of the whole document.
    fn staff_lines(&self) -> Vec<StaffLineId>;

    /// Apply one color inside the open transaction.
    fn apply(&mut self, assignment: &ColorAssignment);
}

/// Pitched notes of the current selection.
pub fn select_working_set<H: ScoreHost + ?Sized>(host: &H) -> Vec<NoteRecord> {
    host.selection()
        .into_iter()
        .filter_map(|element| match element {
            Element::Note(note) => Some(note),
            Element::Unpitched(_) => None,
        })
        .collect()
}

/// An open edit transaction on a host.
///
/// Opening with an empty selection selects everything first; dropping the
/// session closes the transaction and, in that case, drops the selection
/// again. The transaction is closed on every exit path.
pub struct EditSession<'h, H: ScoreHost + ?Sized> {
    host: &'h mut H,
    full_score: bool,
}

impl<'h, H: ScoreHost + ?Sized> EditSession<'h, H> {
    pub fn open(host: &'h mut H) -> Self {
        let full_score = host.selection().is_empty();
        if full_score {
            host.select_all();
        }
        host.start_edit();
        Self { host, full_score }
    }

    /// Whether the session widened an empty selection to the whole score.
    pub fn is_full_score(&self) -> bool {
        self.full_score
    }

    /// Pitched notes the session works on.
    pub fn working_set(&self) -> Vec<NoteRecord> {
        select_working_set(&*self.host)
    }

    pub fn apply_all(&mut self, assignments: &[ColorAssignment]) {
        for assignment in assignments {
            self.host.apply(assignment);
        }
    }
}

impl<H: ScoreHost + ?Sized> Deref for EditSession<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.host
    }
}

impl<H: ScoreHost + ?Sized> DerefMut for EditSession<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.host
    }
}

impl<H: ScoreHost + ?Sized> Drop for EditSession<'_, H> {
    fn drop(&mut self) {
        self.host.end_edit();
        if self.full_score {
            self.host.escape();
        }
    }
}
