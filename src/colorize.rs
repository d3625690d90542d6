//! Role → color mapping and the assignments that carry a note's color
//! to its accidental and augmentation dots.
//!
//! Everything here is pure: callers get a list of [`ColorAssignment`]s and
//! hand them to the host document.

use crate::classify::{self, BarContext, DegreeRole, PitchRole};
use crate::config::ColorConfig;
use crate::error::ScoreError;
use crate::grouping::group_by_bar;
use crate::palette::Color;
use crate::record::{ColorAssignment, NoteRecord, StaffLineId, Target};

/// Color for a note when coloring by pitch class.
pub fn pitch_color(role: PitchRole, pitch: i32, config: &ColorConfig) -> Color {
    match role {
        PitchRole::Lowest => config.lowest_color,
        PitchRole::Root => config.root_color,
        PitchRole::Default => config.palette.color_for(pitch),
    }
}

/// Color for a note when coloring by scale degree.
pub fn degree_color(role: DegreeRole, lowest_pitch: i32, config: &ColorConfig) -> Color {
    let root = config.reference_root_pitch_class;
    match role {
        DegreeRole::Root => config.palette.color_for(root),
        DegreeRole::LowestNonRoot => config.palette.color_for(degree_offset(lowest_pitch, root)),
        DegreeRole::Default => config.uncolored,
    }
}

/// Semitones from `root_pitch_class` up to `pitch`, in `0..12`.
pub fn degree_offset(pitch: i32, root_pitch_class: i32) -> i32 {
    (pitch - root_pitch_class + 12).rem_euclid(12)
}

/// Assign `color` to the note, its accidental and every present dot.
pub fn note_assignments(note: &NoteRecord, color: Color) -> Vec<ColorAssignment> {
    let mut out = Vec::with_capacity(2 + note.dots.len());
    out.push(ColorAssignment::new(Target::Note { note: note.id }, color));
    if note.accidental {
        out.push(ColorAssignment::new(Target::Accidental { note: note.id }, color));
    }
    for (index, _) in note.dots.iter().enumerate().filter(|(_, present)| **present) {
        out.push(ColorAssignment::new(Target::Dot { note: note.id, index }, color));
    }
    out
}

/// Color every note by pitch class, with the lowest note and chord roots
/// overridden. Empty input yields no assignments.
pub fn plan_pitch_colors(notes: &[NoteRecord], config: &ColorConfig) -> Vec<ColorAssignment> {
    let Some(lowest) = classify::lowest_note(notes) else {
        return Vec::new();
    };
    let lowest = lowest.id;

    notes
        .iter()
        .flat_map(|note| {
            let role = classify::pitch_role(note, lowest);
            note_assignments(note, pitch_color(role, note.pitch, config))
        })
        .collect()
}

/// Color each bar's reference-chord root and lowest note by scale degree;
/// every other note gets the uncolored color.
pub fn plan_degree_colors(
    notes: &[NoteRecord],
    ticks_per_measure: i64,
    config: &ColorConfig,
) -> Result<Vec<ColorAssignment>, ScoreError> {
    let mut out = Vec::new();
    for bar in group_by_bar(notes, ticks_per_measure)? {
        let Some(ctx) = BarContext::new(&bar.notes) else {
            continue;
        };
        log::debug!(
            "bar {}: {} notes, lowest {}, root {:?}",
            bar.index,
            bar.notes.len(),
            ctx.lowest.pitch,
            ctx.root
        );
        for note in &bar.notes {
            let color = degree_color(ctx.role(note), ctx.lowest.pitch, config);
            out.extend(note_assignments(note, color));
        }
    }
    Ok(out)
}

/// Color staff lines with the tonic's palette entry.
pub fn plan_staff_line_colors(
    lines: &[StaffLineId],
    config: &ColorConfig,
) -> Vec<ColorAssignment> {
    let color = config.palette.color_for(config.tonic_pitch_class);
    lines
        .iter()
        .map(|&line| ColorAssignment::new(Target::StaffLine { line }, color))
        .collect()
}
