//! Absolute onset ticks for every note of a part.
//!
//! Ticks use a fixed resolution of [`TICKS_PER_QUARTER`] regardless of the
//! MusicXML `<divisions>` in effect, so bar arithmetic works across parts.

use std::collections::HashMap;

use crate::model::{Measure, Part, Score, TimeSignature};

/// Tick resolution (ticks per quarter note).
pub const TICKS_PER_QUARTER: i64 = 480;

const DEFAULT_TIME_SIG: TimeSignature = TimeSignature {
    beats: 4,
    beat_type: 4,
};
const DEFAULT_DIVISIONS: i32 = 1;

/// Length of one measure of `time_sig` in ticks.
pub fn measure_ticks(time_sig: TimeSignature) -> i64 {
    if time_sig.beat_type <= 0 {
        return 0;
    }
    i64::from(time_sig.beats) * 4 * TICKS_PER_QUARTER / i64::from(time_sig.beat_type)
}

/// Ticks per measure of the score: the first time signature, 4/4 if none.
pub fn ticks_per_measure(score: &Score) -> i64 {
    measure_ticks(score.first_time_signature().unwrap_or(DEFAULT_TIME_SIG))
}

/// Onset tick of every note in `part`, indexed `[measure][note]`.
///
/// Positions are tracked per `(staff, voice)`: a `<chord/>` note shares the
/// onset of the note before it, grace notes sit at the current position
/// without advancing it. Measures start where the previous one ended;
/// implicit (pickup) measures last only as long as their content.
pub fn note_ticks(part: &Part) -> Vec<Vec<i64>> {
    let mut out = Vec::with_capacity(part.measures.len());
    let mut time_sig = DEFAULT_TIME_SIG;
    let mut divisions = DEFAULT_DIVISIONS;
    let mut measure_start: i64 = 0;

    for measure in &part.measures {
        if let Some(ref attrs) = measure.attributes {
            if let Some(d) = attrs.divisions.filter(|d| *d > 0) {
                divisions = d;
            }
            if let Some(ts) = attrs.time {
                time_sig = ts;
            }
        }
        let to_ticks = |div: i64| div * TICKS_PER_QUARTER / i64::from(divisions);

        type VoiceKey = (i32, i32); // (staff, voice)
        let mut voice_positions: HashMap<VoiceKey, i64> = HashMap::new();
        let mut last_onset: i64 = 0;
        let mut ticks = Vec::with_capacity(measure.notes.len());

        for note in &measure.notes {
            let vk: VoiceKey = (note.staff.unwrap_or(1), note.voice.unwrap_or(1));
            let pos = voice_positions.entry(vk).or_insert(0);

            if note.chord {
                ticks.push(measure_start + to_ticks(last_onset));
                continue;
            }

            last_onset = *pos;
            ticks.push(measure_start + to_ticks(*pos));
            if !note.grace {
                *pos += i64::from(note.duration);
            }
        }

        let nominal = measure_ticks(time_sig);
        let length = if measure.implicit {
            let actual = to_ticks(content_divisions(measure));
            if actual > 0 && actual < nominal {
                actual
            } else {
                nominal
            }
        } else {
            nominal
        };

        out.push(ticks);
        measure_start += length;
    }

    out
}

/// Longest voice in the measure, in divisions.
fn content_divisions(measure: &Measure) -> i64 {
    let mut totals: HashMap<(i32, i32), i64> = HashMap::new();
    for note in &measure.notes {
        if note.chord || note.grace {
            continue;
        }
        *totals
            .entry((note.staff.unwrap_or(1), note.voice.unwrap_or(1)))
            .or_insert(0) += i64::from(note.duration);
    }
    totals.values().copied().max().unwrap_or(0)
}
