//! Word document model to Org-mode text.
//!
//! One pass over the paragraphs in document order: resolve note references,
//! classify, update list state, emit lines. The note table is built up front
//! and rendered as a trailer.

pub mod classify;
pub mod converter;
pub mod emit;
pub mod footnotes;
pub mod lists;
pub mod refs;

pub use converter::{convert_document, convert_file, ConversionStats};
pub use emit::OrgDocument;
