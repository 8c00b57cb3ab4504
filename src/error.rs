//! Error types for docx2org.
//!
//! [`DocxError`] is fatal for one document: the container or its main body
//! cannot be read, so nothing can be converted. [`NotesError`] describes a
//! note part (or a single note inside one) that could not be read; the
//! converter logs it and carries on with whatever notes were recovered.

use thiserror::Error;

use crate::docx::model::NoteKind;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a readable .docx container: {0}")]
    Container(#[source] anyhow::Error),

    #[error("document has no main part (word/document.xml)")]
    MissingBody,

    #[error("main document part is malformed: {0}")]
    MalformedBody(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum NotesError {
    /// The document carries no part of this kind. Not a failure for conversion.
    #[error("no {kind} part in document")]
    NotFound { kind: NoteKind },

    #[error("malformed {kind} part: {detail}")]
    Malformed { kind: NoteKind, detail: String },

    #[error("malformed {kind} element #{index}: {detail}")]
    MalformedNote {
        kind: NoteKind,
        index: usize,
        detail: String,
    },
}
