//! scorecolor: pitch-class and scale-degree note coloring for MusicXML scores.
//!
//! Supports both uncompressed MusicXML (.musicxml) and compressed MXL (.mxl) files.
//!
//! # Example
//! ```no_run
//! use scorecolor::{parse_file, ColorConfig, Document};
//!
//! let score = parse_file("path/to/score.musicxml").unwrap();
//! let mut doc = Document::new(score);
//! let report = scorecolor::color_notes(&mut doc, &ColorConfig::color_notes()).unwrap();
//! println!("Colored {} notes", report.notes);
//! ```

pub mod classify;
pub mod colorize;
pub mod config;
pub mod document;
pub mod error;
pub mod grouping;
pub mod model;
pub mod mxl;
pub mod palette;
pub mod parser;
pub mod plugin;
pub mod record;
pub mod selection;
pub mod timeline;

use std::path::Path;

pub use config::ColorConfig;
pub use document::Document;
pub use error::ScoreError;
pub use model::*;
pub use mxl::parse_mxl;
pub use palette::{Color, Palette};
pub use parser::parse_musicxml;
pub use plugin::{color_notes, degree_colors, RunReport, Variant};
pub use record::{ColorAssignment, NoteId, NoteRecord, Target};
pub use selection::{EditSession, Element, ScoreHost};

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score, ScoreError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| ScoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score, ScoreError> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => {
            let xml = std::str::from_utf8(data)
                .map_err(|e| ScoreError::Xml(format!("invalid UTF-8: {e}")))?;
            parse_musicxml(xml)
        }
        _ => {
            // Auto-detect: try as XML first, then as MXL
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return parse_musicxml(xml);
                }
            }
            parse_mxl(data)
        }
    }
}

/// Convert a score (including any applied colors) to a JSON string.
pub fn score_to_json(score: &Score) -> Result<String, ScoreError> {
    serde_json::to_string_pretty(score).map_err(|e| ScoreError::Config(e.to_string()))
}

/// Convert a run report to a JSON string.
pub fn report_to_json(report: &RunReport) -> Result<String, ScoreError> {
    serde_json::to_string_pretty(report).map_err(|e| ScoreError::Config(e.to_string()))
}

/// Parse MusicXML bytes and color the whole score with the built-in
/// configuration of `variant`.
pub fn color_bytes(
    data: &[u8],
    extension: Option<&str>,
    variant: Variant,
) -> Result<(RunReport, Score), ScoreError> {
    let mut doc = Document::new(parse_bytes(data, extension)?);
    let report = plugin::run(&mut doc, variant, &variant.default_config())?;
    Ok((report, doc.into_score()))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Color MusicXML bytes and return the JSON run report as a C string.
/// The caller must free the returned string with `scorecolor_free_string`.
///
/// `variant` is 0 for colornotes, 1 for degreecolors.
///
/// # Safety
/// `data` must point to `len` valid bytes. `extension` may be null.
#[no_mangle]
pub unsafe extern "C" fn scorecolor_color_bytes(
    data: *const u8,
    len: usize,
    extension: *const c_char,
    variant: u32,
) -> *mut c_char {
    if data.is_null() || len == 0 {
        return std::ptr::null_mut();
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    let ext = if extension.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(extension) }.to_str().ok()
    };
    let variant = match variant {
        0 => Variant::ColorNotes,
        1 => Variant::DegreeColors,
        _ => return std::ptr::null_mut(),
    };

    match color_bytes(bytes, ext, variant).and_then(|(report, _)| report_to_json(&report)) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by scorecolor functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a scorecolor function, or null.
#[no_mangle]
pub unsafe extern "C" fn scorecolor_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
