//! Note and reference diagnostics for a single document.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::docx::model::{DocumentSource, NoteKind, NoteRef};
use crate::org::classify::classify;
use crate::org::converter::{convert_document, ConversionStats};
use crate::org::footnotes::FootnoteTable;
use crate::org::refs::{resolve_references, ReferenceMarker};

const NOTE_PREVIEW_CHARS: usize = 50;
const PARAGRAPH_PREVIEW_CHARS: usize = 100;

/// Reference marks typed as plain text instead of real note references.
static TYPED_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{00b9}\u{00b2}\u{00b3}]+|[\u{2070}-\u{2079}]+|†+|‡+|§+")
        .expect("typed marker")
});

#[derive(Clone, Debug, Serialize)]
pub struct NoteSummary {
    pub number: usize,
    pub kind: NoteKind,
    pub id: String,
    pub preview: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParagraphSummary {
    /// 1-based position among all body paragraphs.
    pub index: usize,
    pub classification: &'static str,
    pub has_bold: bool,
    pub markers: Vec<ReferenceMarker>,
    pub unresolved: Vec<NoteRef>,
    pub typed_markers: Vec<String>,
    pub preview: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub notes: Vec<NoteSummary>,
    pub paragraphs: Vec<ParagraphSummary>,
    /// Output numbers of notes no paragraph refers to.
    pub unreferenced_notes: Vec<usize>,
    pub stats: ConversionStats,
}

fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn inspect_document(doc: &dyn DocumentSource) -> InspectReport {
    let table = FootnoteTable::extract(doc);
    let notes = table
        .numbered()
        .map(|(number, record)| NoteSummary {
            number,
            kind: record.kind,
            id: record.id.clone(),
            preview: preview(&record.text, NOTE_PREVIEW_CHARS),
        })
        .collect();

    let mut referenced = BTreeSet::new();
    let mut paragraphs = Vec::new();
    for (i, paragraph) in doc.paragraphs().iter().enumerate() {
        let refs = resolve_references(paragraph, &table);
        let Some(classification) = classify(paragraph, &refs) else {
            continue;
        };
        for note_ref in paragraph.runs.iter().flat_map(|r| &r.note_refs) {
            if let Some(n) = table.output_number(note_ref) {
                referenced.insert(n);
            }
        }
        let text = paragraph.text();
        paragraphs.push(ParagraphSummary {
            index: i + 1,
            classification: classification.label(),
            has_bold: paragraph.has_bold(),
            typed_markers: TYPED_MARKER_RE
                .find_iter(&text)
                .map(|m| m.as_str().to_string())
                .collect(),
            preview: preview(&text, PARAGRAPH_PREVIEW_CHARS),
            markers: refs.markers,
            unresolved: refs.unresolved,
        });
    }

    let unreferenced_notes = (1..=table.len())
        .filter(|n| !referenced.contains(n))
        .collect();

    InspectReport {
        notes,
        paragraphs,
        unreferenced_notes,
        stats: convert_document(doc).stats,
    }
}

impl InspectReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report; paragraphs without references or typed marks are left out.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "notes: {}", self.notes.len());
        for note in &self.notes {
            let _ = writeln!(
                out,
                "  [fn:{}] {} id={} {}",
                note.number, note.kind, note.id, note.preview
            );
        }

        let _ = writeln!(out, "paragraphs:");
        for p in &self.paragraphs {
            if p.markers.is_empty() && p.unresolved.is_empty() && p.typed_markers.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "  #{} {} (bold: {})",
                p.index, p.classification, p.has_bold
            );
            for m in &p.markers {
                let _ = writeln!(out, "    run {}: {}", m.run_index, m.token);
            }
            for r in &p.unresolved {
                let _ = writeln!(out, "    unresolved {} id={}", r.kind, r.id);
            }
            if !p.typed_markers.is_empty() {
                let _ = writeln!(out, "    typed marks: {}", p.typed_markers.join(" "));
            }
            let _ = writeln!(out, "    text: {}", p.preview);
        }

        if !self.unreferenced_notes.is_empty() {
            let nums: Vec<String> = self
                .unreferenced_notes
                .iter()
                .map(|n| n.to_string())
                .collect();
            let _ = writeln!(out, "unreferenced notes: {}", nums.join(", "));
        }
        let _ = write!(
            out,
            "{} line(s), {} reference(s) resolved, {} dropped",
            self.stats.emitted_lines, self.stats.resolved_refs, self.stats.unresolved_refs
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{inspect_document, preview};
    use crate::docx::model::{MemoryDocument, NoteKind, Paragraph, Run};

    fn sample() -> MemoryDocument {
        MemoryDocument::new(vec![
            Paragraph::from_runs(vec![
                Run::plain("See").with_note_ref(NoteKind::Footnote, "3"),
                Run::bold(" this").with_note_ref(NoteKind::Footnote, "77"),
            ]),
            Paragraph::from_runs(vec![Run::plain("   ")]),
            Paragraph::from_runs(vec![Run::plain("Typed mark² and †")]),
        ])
        .with_notes(NoteKind::Footnote, vec![("3", "three"), ("5", "five")])
    }

    #[test]
    fn reports_markers_unresolved_and_unreferenced() {
        let report = inspect_document(&sample());
        assert_eq!(report.notes.len(), 2);
        assert_eq!(report.paragraphs.len(), 2);

        let first = &report.paragraphs[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.classification, "bold_segmented");
        assert_eq!(first.markers.len(), 1);
        assert_eq!(first.markers[0].token, "[fn:1]");
        assert_eq!(first.unresolved[0].id, "77");

        assert_eq!(report.paragraphs[1].index, 3);
        assert_eq!(report.paragraphs[1].typed_markers, vec!["²", "†"]);
        assert_eq!(report.unreferenced_notes, vec![2]);
        assert_eq!(report.stats.unresolved_refs, 1);
    }

    #[test]
    fn json_and_text_renderings() {
        let report = inspect_document(&sample());
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("json")).expect("parse");
        assert_eq!(json["notes"][0]["kind"], "footnote");
        assert_eq!(json["paragraphs"][0]["markers"][0]["run_index"], 0);

        let text = report.render_text();
        assert!(text.contains("[fn:1] footnotes id=3 three"));
        assert!(text.contains("unresolved footnotes id=77"));
        assert!(text.contains("unreferenced notes: 2"));
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(preview("  אבגדה  ", 3), "אבג...");
        assert_eq!(preview("short", 10), "short");
    }
}
