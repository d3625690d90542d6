//! The two coloring runs.
//!
//! Both work on the current selection (the whole score when nothing is
//! selected) inside one edit transaction:
//!
//! - [`color_notes`] colors by pitch class, marks the lowest note and chord
//!   roots, then colors the staff lines after the tonic.
//! - [`degree_colors`] colors each bar's reference-chord root and lowest
//!   note by scale degree relative to a fixed root and blacks out the rest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::colorize;
use crate::config::ColorConfig;
use crate::error::ScoreError;
use crate::record::ColorAssignment;
use crate::selection::{EditSession, ScoreHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    ColorNotes,
    DegreeColors,
}

impl Variant {
    /// Built-in configuration for this variant.
    pub fn default_config(self) -> ColorConfig {
        match self {
            Variant::ColorNotes => ColorConfig::color_notes(),
            Variant::DegreeColors => ColorConfig::degree_colors(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::ColorNotes => "colornotes",
            Variant::DegreeColors => "degreecolors",
        })
    }
}

impl FromStr for Variant {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "colornotes" => Ok(Variant::ColorNotes),
            "degreecolors" => Ok(Variant::DegreeColors),
            other => Err(ScoreError::Config(format!("unknown variant '{other}'"))),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub variant: Variant,
    /// Pitched notes in the working set
    pub notes: usize,
    /// Whether the run widened an empty selection to the whole score
    pub full_score: bool,
    pub assignments: Vec<ColorAssignment>,
}

/// Run `variant` against `host`.
pub fn run<H: ScoreHost + ?Sized>(
    host: &mut H,
    variant: Variant,
    config: &ColorConfig,
) -> Result<RunReport, ScoreError> {
    match variant {
        Variant::ColorNotes => color_notes(host, config),
        Variant::DegreeColors => degree_colors(host, config),
    }
}

/// Color by pitch class with lowest-note and chord-root overrides, then
/// color the staff lines after the tonic.
pub fn color_notes<H: ScoreHost + ?Sized>(
    host: &mut H,
    config: &ColorConfig,
) -> Result<RunReport, ScoreError> {
    config.validate()?;
    let mut session = EditSession::open(host);
    let notes = session.working_set();
    log::info!("colornotes: {} notes", notes.len());

    let mut assignments = colorize::plan_pitch_colors(&notes, config);
    if !notes.is_empty() {
        let lines = session.staff_lines();
        assignments.extend(colorize::plan_staff_line_colors(&lines, config));
    }
    session.apply_all(&assignments);

    Ok(RunReport {
        variant: Variant::ColorNotes,
        notes: notes.len(),
        full_score: session.is_full_score(),
        assignments,
    })
}

/// Color by scale degree, bar by bar.
///
/// A non-positive measure length colors nothing; the transaction is still
/// closed before the error is returned.
pub fn degree_colors<H: ScoreHost + ?Sized>(
    host: &mut H,
    config: &ColorConfig,
) -> Result<RunReport, ScoreError> {
    config.validate()?;
    let mut session = EditSession::open(host);
    let notes = session.working_set();
    log::info!("degreecolors: {} notes", notes.len());

    let ticks_per_measure = session.ticks_per_measure();
    let assignments = colorize::plan_degree_colors(&notes, ticks_per_measure, config)
        .inspect_err(|e| log::warn!("degreecolors: nothing colored: {e}"))?;
    session.apply_all(&assignments);

    Ok(RunReport {
        variant: Variant::DegreeColors,
        notes: notes.len(),
        full_score: session.is_full_score(),
        assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names() {
        assert_eq!("colornotes".parse::<Variant>().unwrap(), Variant::ColorNotes);
        assert_eq!("degreecolors".parse::<Variant>().unwrap(), Variant::DegreeColors);
        assert!("rainbow".parse::<Variant>().is_err());
        assert_eq!(Variant::DegreeColors.to_string(), "degreecolors");
        assert_eq!(
            serde_json::to_string(&Variant::ColorNotes).unwrap(),
            "\"colornotes\""
        );
    }
}
