//! MusicXML parser: converts MusicXML XML into the Score data model.

use roxmltree::{Document, Node};

use crate::error::ScoreError;
use crate::model::*;

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score, ScoreError> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| ScoreError::Xml(e.to_string()))?;
    let root = doc.root_element();

    // Verify this is a score-partwise document
    if root.tag_name().name() != "score-partwise" {
        return Err(ScoreError::UnsupportedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "identification" => parse_identification(&child, &mut score),
            "credit" => parse_credit(&child, &mut score),
            "part-list" => parse_part_list(&child, &mut score),
            "part" => parse_part(&child, &mut score),
            _ => {}
        }
    }

    Ok(score)
}

// ─── Work / Identification / Credits ─────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        // <credit type="title"> takes priority over <work-title>
        if child.tag_name().name() == "work-title" && score.title.is_none() {
            score.title = child.text().map(|t| t.trim().to_string());
        }
    }
}

fn parse_identification(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "creator"
            && child.attribute("type") == Some("composer")
            && score.composer.is_none()
        {
            score.composer = child.text().map(|t| t.trim().to_string());
        }
    }
}

fn parse_credit(node: &Node, score: &mut Score) {
    let mut credit_type = String::new();
    let mut credit_text = String::new();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "credit-type" => {
                credit_type = child.text().unwrap_or("").trim().to_string();
            }
            "credit-words" => {
                let text = child.text().unwrap_or("").trim();
                if !text.is_empty() {
                    if !credit_text.is_empty() {
                        credit_text.push('\n');
                    }
                    credit_text.push_str(text);
                }
            }
            _ => {}
        }
    }

    if credit_text.is_empty() {
        return;
    }
    match credit_type.as_str() {
        "title" => score.title = Some(credit_text),
        "composer" => score.composer = Some(credit_text),
        _ => {}
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() != "score-part" {
            continue;
        }
        let id = child.attribute("id").unwrap_or("").to_string();
        let name = child
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "part-name")
            .and_then(|n| n.text())
            .unwrap_or("")
            .trim()
            .to_string();

        score.parts.push(Part {
            id,
            name,
            measures: Vec::new(),
            staff_details: Vec::new(),
        });
    }
}

// ─── Part (measures) ─────────────────────────────────────────────────

fn parse_part(node: &Node, score: &mut Score) {
    let part_id = node.attribute("id").unwrap_or("").to_string();

    // Find the matching part from the part-list
    let part = match score.parts.iter_mut().find(|p| p.id == part_id) {
        Some(p) => p,
        None => return,
    };

    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "measure" {
            let (measure, details) = parse_measure(&child);
            part.measures.push(measure);
            for d in details {
                // Later declarations replace earlier ones for the same staff
                match part.staff_details.iter_mut().find(|s| s.staff == d.staff) {
                    Some(existing) => *existing = d,
                    None => part.staff_details.push(d),
                }
            }
        }
    }
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node) -> (Measure, Vec<StaffDetails>) {
    let number = node
        .attribute("number")
        .and_then(|n| n.parse::<i32>().ok())
        .unwrap_or(0);
    let implicit = node.attribute("implicit") == Some("yes");

    let mut measure = Measure {
        number,
        implicit,
        attributes: None,
        notes: Vec::new(),
    };
    let mut staff_details = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => {
                let (attrs, details) = parse_attributes(&child);
                // Later <attributes> blocks in the same measure only override what they set.
                let merged = measure.attributes.get_or_insert_with(Attributes::default);
                merged.divisions = attrs.divisions.or(merged.divisions);
                merged.time = attrs.time.or(merged.time);
                merged.staves = attrs.staves.or(merged.staves);
                staff_details.extend(details);
            }
            "note" => measure.notes.push(parse_note(&child)),
            _ => {}
        }
    }

    (measure, staff_details)
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node) -> (Attributes, Vec<StaffDetails>) {
    let mut attrs = Attributes::default();
    let mut staff_details = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "divisions" => attrs.divisions = parse_i32(&child),
            "time" => attrs.time = Some(parse_time(&child)),
            "staves" => attrs.staves = parse_i32(&child),
            "staff-details" => staff_details.push(parse_staff_details(&child)),
            _ => {}
        }
    }

    (attrs, staff_details)
}

fn parse_time(node: &Node) -> TimeSignature {
    let mut ts = TimeSignature {
        beats: 4,
        beat_type: 4,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "beats" => ts.beats = parse_i32(&child).unwrap_or(4),
            "beat-type" => ts.beat_type = parse_i32(&child).unwrap_or(4),
            _ => {}
        }
    }
    ts
}

fn parse_staff_details(node: &Node) -> StaffDetails {
    let staff = node
        .attribute("number")
        .and_then(|n| n.parse::<i32>().ok())
        .unwrap_or(1);
    let lines = node
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "staff-lines")
        .and_then(|n| parse_i32(&n))
        .unwrap_or(DEFAULT_STAFF_LINES);

    let mut details = StaffDetails::new(staff, lines);
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() != "line-detail" {
            continue;
        }
        let line = child.attribute("line").and_then(|l| l.parse::<i32>().ok());
        if let (Some(line), Some(color)) = (line, child.attribute("color")) {
            details.set_line_color(line, color.to_string());
        }
    }
    details
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node) -> Note {
    let mut note = Note::rest(0);
    note.rest = false;
    note.color = node.attribute("color").map(String::from);

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => note.pitch = Some(parse_pitch(&child)),
            "duration" => note.duration = parse_i32(&child).unwrap_or(0),
            "voice" => note.voice = parse_i32(&child),
            "staff" => note.staff = parse_i32(&child),
            "rest" => note.rest = true,
            "grace" => note.grace = true,
            "chord" => note.chord = true,
            "dot" => note.dots.push(Dot {
                color: child.attribute("color").map(String::from),
            }),
            "accidental" => {
                note.accidental = Some(Accidental {
                    kind: child.text().unwrap_or("").trim().to_string(),
                    color: child.attribute("color").map(String::from),
                });
            }
            _ => {}
        }
    }

    // Unpitched percussion and malformed notes without <pitch> behave as rests
    if note.pitch.is_none() {
        note.rest = true;
    }

    note
}

fn parse_pitch(node: &Node) -> Pitch {
    let mut pitch = Pitch {
        step: "C".to_string(),
        octave: 4,
        alter: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => {
                pitch.step = child.text().unwrap_or("C").trim().to_string();
            }
            "octave" => pitch.octave = parse_i32(&child).unwrap_or(4),
            "alter" => pitch.alter = parse_f64(&child),
            _ => {}
        }
    }
    pitch
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text()?.trim().parse().ok()
}
