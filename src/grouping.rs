//! Partition notes into bars by onset tick.

use std::collections::HashMap;

use crate::error::ScoreError;
use crate::record::NoteRecord;

/// Notes whose onset falls in one measure-length window.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar<'a> {
    /// `tick / ticks_per_measure`
    pub index: i64,
    pub notes: Vec<&'a NoteRecord>,
}

/// Group `notes` by `tick / ticks_per_measure`.
///
/// Bars come out in the order they are first encountered, not sorted by
/// index, and each bar keeps its notes in input order.
pub fn group_by_bar(
    notes: &[NoteRecord],
    ticks_per_measure: i64,
) -> Result<Vec<Bar<'_>>, ScoreError> {
    if ticks_per_measure <= 0 {
        return Err(ScoreError::InvalidTicksPerMeasure(ticks_per_measure));
    }

    let mut bars: Vec<Bar<'_>> = Vec::new();
    let mut slots: HashMap<i64, usize> = HashMap::new();

    for note in notes {
        let index = note.tick.div_euclid(ticks_per_measure);
        let slot = *slots.entry(index).or_insert_with(|| {
            bars.push(Bar {
                index,
                notes: Vec::new(),
            });
            bars.len() - 1
        });
        bars[slot].notes.push(note);
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NoteId;

    fn note(index: usize, tick: i64) -> NoteRecord {
        NoteRecord::new(NoteId::new(0, 0, index), 60, tick)
    }

    #[test]
    fn groups_in_first_encounter_order() {
        let notes = vec![
            note(0, 1920),
            note(1, 0),
            note(2, 2400),
            note(3, 480),
            note(4, 3839),
        ];
        let bars = group_by_bar(&notes, 1920).unwrap();

        let layout: Vec<(i64, Vec<usize>)> = bars
            .iter()
            .map(|b| (b.index, b.notes.iter().map(|n| n.id.index).collect()))
            .collect();
        assert_eq!(layout, vec![(1, vec![0, 2, 4]), (0, vec![1, 3])]);
    }

    #[test]
    fn empty_input_has_no_bars() {
        assert!(group_by_bar(&[], 1920).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_positive_ticks_per_measure() {
        let notes = vec![note(0, 0)];
        assert!(matches!(
            group_by_bar(&notes, 0),
            Err(ScoreError::InvalidTicksPerMeasure(0))
        ));
        assert!(matches!(
            group_by_bar(&notes, -480),
            Err(ScoreError::InvalidTicksPerMeasure(-480))
        ));
    }
}
