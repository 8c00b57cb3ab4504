//! Word (`.docx`) to Org-mode conversion.
//!
//! [`docx`] reads the container into a small document model, [`org`] turns
//! that model into Org text. [`batch`], [`cleaner`] and [`inspect`] are the
//! operations the command-line tool is built from.

pub mod batch;
pub mod cleaner;
pub mod config;
pub mod docx;
pub mod error;
pub mod inspect;
pub mod org;
pub mod progress;

pub use docx::document::WordDocument;
pub use docx::model::{DocumentSource, MemoryDocument};
pub use error::{DocxError, NotesError};
pub use org::{convert_document, convert_file, ConversionStats, OrgDocument};
