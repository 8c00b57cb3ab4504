use std::io::{Read, Seek};
use std::path::Path;

use tracing::{debug, warn};

use crate::docx::body::extract_body_paragraphs;
use crate::docx::model::{DocumentSource, NoteEntry, NoteKind, Paragraph};
use crate::docx::notes::parse_note_part;
use crate::docx::package::DocxPackage;
use crate::docx::rels::{default_note_part_path, Relationships, DOCUMENT_RELS_PART};
use crate::docx::styles::{StyleSheet, STYLES_PART};
use crate::docx::xml::parse_xml_part;
use crate::error::{DocxError, NotesError};

pub const DOCUMENT_PART: &str = "word/document.xml";

/// A `.docx` file parsed into the converter's document model.
pub struct WordDocument {
    package: DocxPackage,
    rels: Relationships,
    paragraphs: Vec<Paragraph>,
}

impl WordDocument {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let package = DocxPackage::read(path).map_err(DocxError::Container)?;
        Self::from_package(package)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let package = DocxPackage::from_reader(reader).map_err(DocxError::Container)?;
        Self::from_package(package)
    }

    pub fn from_package(package: DocxPackage) -> Result<Self, DocxError> {
        let body_xml = package.part(DOCUMENT_PART).ok_or(DocxError::MissingBody)?;
        let body = parse_xml_part(DOCUMENT_PART, body_xml).map_err(DocxError::MalformedBody)?;

        let styles = match package.part(STYLES_PART) {
            Some(xml) => StyleSheet::parse(xml).unwrap_or_else(|err| {
                warn!("ignoring unreadable {STYLES_PART}: {err:#}");
                StyleSheet::default()
            }),
            None => StyleSheet::default(),
        };
        let rels = match package.part(DOCUMENT_RELS_PART) {
            Some(xml) => Relationships::parse(xml).unwrap_or_else(|err| {
                warn!("ignoring unreadable {DOCUMENT_RELS_PART}: {err:#}");
                Relationships::default()
            }),
            None => Relationships::default(),
        };

        let paragraphs = extract_body_paragraphs(&body, &styles);
        debug!(
            paragraphs = paragraphs.len(),
            styles = styles.len(),
            relationships = rels.items.len(),
            "parsed document body"
        );
        Ok(Self {
            package,
            rels,
            paragraphs,
        })
    }

    /// Package path of the note part of `kind`: the related part when the
    /// document declares one, else the conventional location if present.
    fn note_part_path(&self, kind: NoteKind) -> Option<String> {
        if let Some(path) = self.rels.note_part_path(kind) {
            return Some(path);
        }
        let fallback = default_note_part_path(kind);
        self.package
            .has_part(fallback)
            .then(|| fallback.to_string())
    }
}

impl DocumentSource for WordDocument {
    fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    fn notes(&self, kind: NoteKind) -> Result<Vec<NoteEntry>, NotesError> {
        let path = self
            .note_part_path(kind)
            .ok_or(NotesError::NotFound { kind })?;
        let xml = self
            .package
            .part(&path)
            .ok_or_else(|| NotesError::Malformed {
                kind,
                detail: format!("{path}: relationship target missing from package"),
            })?;
        Ok(parse_note_part(kind, &path, xml))
    }
}
