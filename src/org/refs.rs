use serde::Serialize;
use tracing::debug;

use crate::docx::model::{NoteRef, Paragraph};
use crate::org::footnotes::FootnoteTable;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReferenceMarker {
    pub run_index: usize,
    pub token: String,
}

/// Markers of one paragraph plus the references that matched no note.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub markers: Vec<ReferenceMarker>,
    pub unresolved: Vec<NoteRef>,
}

impl ResolvedReferences {
    /// Tokens attached to `run_index`, in the order they were found.
    pub fn tokens_for_run(&self, run_index: usize) -> impl Iterator<Item = &str> {
        self.markers
            .iter()
            .filter(move |m| m.run_index == run_index)
            .map(|m| m.token.as_str())
    }
}

pub fn footnote_token(number: usize) -> String {
    format!("[fn:{number}]")
}

pub fn resolve_references(paragraph: &Paragraph, table: &FootnoteTable) -> ResolvedReferences {
    let mut resolved = ResolvedReferences::default();
    for (run_index, run) in paragraph.runs.iter().enumerate() {
        for note_ref in &run.note_refs {
            match table.output_number(note_ref) {
                Some(n) => resolved.markers.push(ReferenceMarker {
                    run_index,
                    token: footnote_token(n),
                }),
                None => {
                    debug!(
                        kind = %note_ref.kind,
                        id = %note_ref.id,
                        "dropping unresolved note reference"
                    );
                    resolved.unresolved.push(note_ref.clone());
                }
            }
        }
    }
    resolved
}

/// Run text with each run's reference tokens appended right after it.
pub fn run_text_with_tokens(
    paragraph: &Paragraph,
    refs: &ResolvedReferences,
    run_index: usize,
) -> String {
    let mut text = paragraph
        .runs
        .get(run_index)
        .map(|r| r.text.clone())
        .unwrap_or_default();
    for token in refs.tokens_for_run(run_index) {
        text.push_str(token);
    }
    text
}

/// Paragraph text with reference tokens spliced in after their runs.
pub fn splice_text(paragraph: &Paragraph, refs: &ResolvedReferences) -> String {
    if refs.markers.is_empty() {
        return paragraph.text();
    }
    (0..paragraph.runs.len())
        .map(|i| run_text_with_tokens(paragraph, refs, i))
        .collect()
}
