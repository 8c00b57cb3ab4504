use serde::Serialize;
use tracing::{debug, warn};

use crate::docx::model::{DocumentSource, NoteElement, NoteKind, NoteRef};
use crate::error::NotesError;

/// Reserved continuation-separator id; never a real note.
const RESERVED_NOTE_ID: &str = "0";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FootnoteRecord {
    pub kind: NoteKind,
    pub id: String,
    pub text: String,
}

/// Notes of one document in output order. Output number = position + 1.
#[derive(Clone, Debug, Default)]
pub struct FootnoteTable {
    records: Vec<FootnoteRecord>,
}

impl FootnoteTable {
    /// Footnotes first, then endnotes, each in source order.
    pub fn extract(doc: &dyn DocumentSource) -> Self {
        let mut table = Self::default();
        for kind in [NoteKind::Footnote, NoteKind::Endnote] {
            table.extend_from(doc, kind);
        }
        debug!(notes = table.len(), "extracted note table");
        table
    }

    pub fn from_records(records: Vec<FootnoteRecord>) -> Self {
        Self { records }
    }

    fn extend_from(&mut self, doc: &dyn DocumentSource, kind: NoteKind) {
        let entries = match doc.notes(kind) {
            Ok(entries) => entries,
            Err(NotesError::NotFound { .. }) => {
                debug!("document has no {kind}");
                return;
            }
            Err(err) => {
                warn!("skipping {kind}: {err}");
                return;
            }
        };
        for entry in entries {
            match entry {
                Ok(note) => {
                    if let Some(record) = note_record(kind, note) {
                        self.records.push(record);
                    }
                }
                Err(err) => warn!("skipping note: {err}"),
            }
        }
    }

    /// 1-based output number of the first record with the same kind and id.
    pub fn output_number(&self, note_ref: &NoteRef) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.kind == note_ref.kind && r.id == note_ref.id)
            .map(|i| i + 1)
    }

    pub fn records(&self) -> &[FootnoteRecord] {
        &self.records
    }

    /// `(output number, record)` pairs.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &FootnoteRecord)> {
        self.records.iter().enumerate().map(|(i, r)| (i + 1, r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn note_record(kind: NoteKind, note: NoteElement) -> Option<FootnoteRecord> {
    if note.id == RESERVED_NOTE_ID {
        return None;
    }
    // Separator notes carry w:type; ordinary notes may say "normal" or nothing.
    if note
        .note_type
        .as_deref()
        .is_some_and(|t| !t.eq_ignore_ascii_case("normal"))
    {
        return None;
    }
    let text = note.text_nodes.concat();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(FootnoteRecord {
        kind,
        id: note.id,
        text: text.to_string(),
    })
}
