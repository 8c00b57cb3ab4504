pub mod body;
pub mod document;
pub mod model;
pub mod notes;
pub mod package;
pub mod rels;
pub mod styles;
pub mod xml;
