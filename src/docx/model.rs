//! Document model consumed by the Org transformation.
//!
//! The converter never touches the container directly: it sees paragraphs
//! and note entries through [`DocumentSource`]. [`crate::docx::document::WordDocument`]
//! implements it for real `.docx` files, [`MemoryDocument`] for hand-built input.

use std::fmt;

use serde::Serialize;

use crate::error::NotesError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Footnote,
    Endnote,
}

impl NoteKind {
    /// Element name of one note inside its part (`w:footnote` / `w:endnote`).
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Footnote => "w:footnote",
            Self::Endnote => "w:endnote",
        }
    }

    /// Element name of a reference to this kind of note inside a run.
    pub fn reference_name(self) -> &'static str {
        match self {
            Self::Footnote => "w:footnoteReference",
            Self::Endnote => "w:endnoteReference",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Footnote => f.write_str("footnotes"),
            Self::Endnote => f.write_str("endnotes"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoteRef {
    pub kind: NoteKind,
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub note_refs: Vec<NoteRef>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    pub fn with_note_ref(mut self, kind: NoteKind, id: impl Into<String>) -> Self {
        self.note_refs.push(NoteRef {
            kind,
            id: id.into(),
        });
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParagraphStyle {
    pub id: String,
    pub name: String,
    /// `w:ilvl` declared by the style's own numbering properties.
    pub ilvl: Option<i32>,
}

/// Raw `w:numPr` of a paragraph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberingProps {
    pub num_id: Option<String>,
    pub ilvl: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub style: Option<ParagraphStyle>,
    pub alignment: Option<String>,
    pub numbering: Option<NumberingProps>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, id: &str, name: &str) -> Self {
        self.style = Some(ParagraphStyle {
            id: id.to_string(),
            name: name.to_string(),
            ilvl: None,
        });
        self
    }

    pub fn with_alignment(mut self, jc: &str) -> Self {
        self.alignment = Some(jc.to_string());
        self
    }

    pub fn with_numbering(mut self, num_id: Option<&str>, ilvl: Option<i32>) -> Self {
        self.numbering = Some(NumberingProps {
            num_id: num_id.map(str::to_string),
            ilvl,
        });
        self
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn has_bold(&self) -> bool {
        self.runs.iter().any(|r| r.bold)
    }
}

/// One `w:footnote` / `w:endnote` element as found in its part.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteElement {
    pub id: String,
    /// `w:type` (`separator`, `continuationSeparator`, ...), absent for ordinary notes.
    pub note_type: Option<String>,
    /// Text of every `w:t` inside the note, in document order.
    pub text_nodes: Vec<String>,
}

pub type NoteEntry = Result<NoteElement, NotesError>;

/// Narrow capability interface over a parsed document.
pub trait DocumentSource {
    fn paragraphs(&self) -> &[Paragraph];

    /// Note elements of one kind in source order. `Err(NotFound)` when the
    /// document has no such part; individual entries may be `Err` when a
    /// single note could not be read.
    fn notes(&self, kind: NoteKind) -> Result<Vec<NoteEntry>, NotesError>;
}

/// A document assembled in memory.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    pub paragraphs: Vec<Paragraph>,
    pub footnotes: Option<Vec<NoteElement>>,
    pub endnotes: Option<Vec<NoteElement>>,
}

impl MemoryDocument {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, kind: NoteKind, notes: Vec<(&str, &str)>) -> Self {
        let elems = notes
            .into_iter()
            .map(|(id, text)| NoteElement {
                id: id.to_string(),
                note_type: None,
                text_nodes: vec![text.to_string()],
            })
            .collect();
        match kind {
            NoteKind::Footnote => self.footnotes = Some(elems),
            NoteKind::Endnote => self.endnotes = Some(elems),
        }
        self
    }
}

impl DocumentSource for MemoryDocument {
    fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    fn notes(&self, kind: NoteKind) -> Result<Vec<NoteEntry>, NotesError> {
        let notes = match kind {
            NoteKind::Footnote => self.footnotes.as_ref(),
            NoteKind::Endnote => self.endnotes.as_ref(),
        };
        notes
            .map(|n| n.iter().cloned().map(Ok).collect())
            .ok_or(NotesError::NotFound { kind })
    }
}
