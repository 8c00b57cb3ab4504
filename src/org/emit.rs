use crate::org::classify::{Classification, ListKind};
use crate::org::converter::ConversionStats;
use crate::org::footnotes::FootnoteRecord;
use crate::org::refs::footnote_token;

pub const FOOTNOTES_HEADING: &str = "* Footnotes";
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const LIST_INDENT: &str = "  ";
const BULLETS: [&str; 3] = ["-", "+", "*"];

/// Output lines of one classified paragraph. `number` is the item number
/// assigned to an ordered list item.
pub fn emit_lines(classification: &Classification, number: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    match classification {
        Classification::Heading { level, text } => {
            push_nonblank(&mut lines, text, |t| {
                format!("{} {t}", "*".repeat(usize::from(*level)))
            });
        }
        Classification::CenteredHeading { text } => {
            push_nonblank(&mut lines, text, |t| format!("* {t}"));
        }
        Classification::ListItem { kind, level, text } => {
            push_nonblank(&mut lines, text, |t| {
                format!("{}{t}", list_prefix(*kind, *level, number))
            });
        }
        Classification::BoldSegmented {
            bold_parts,
            regular_parts,
        } => {
            for part in bold_parts {
                push_nonblank(&mut lines, part, |t| format!("** {}", t.trim()));
            }
            for part in regular_parts {
                push_nonblank(&mut lines, part, str::to_string);
            }
        }
        Classification::Plain { text } => {
            push_nonblank(&mut lines, text, str::to_string);
        }
    }
    lines
}

fn push_nonblank(lines: &mut Vec<String>, text: &str, render: impl FnOnce(&str) -> String) {
    if !text.trim().is_empty() {
        lines.push(render(text));
    }
}

/// Indent plus bullet or number for a list item at `level`.
pub fn list_prefix(kind: ListKind, level: usize, number: Option<usize>) -> String {
    let indent = LIST_INDENT.repeat(level);
    match kind {
        ListKind::Unordered => format!("{indent}{} ", BULLETS[level % BULLETS.len()]),
        ListKind::Ordered => format!("{indent}{}. ", number.unwrap_or(1)),
    }
}

/// Trailer lines for the note table; empty when there are no notes.
pub fn footnote_trailer(footnotes: &[FootnoteRecord]) -> Vec<String> {
    if footnotes.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::with_capacity(footnotes.len() + 2);
    lines.push(String::new());
    lines.push(FOOTNOTES_HEADING.to_string());
    for (i, note) in footnotes.iter().enumerate() {
        lines.push(format!("{} {}", footnote_token(i + 1), note.text));
    }
    lines
}

/// Result of converting one document.
#[derive(Clone, Debug, Default)]
pub struct OrgDocument {
    /// Body lines in document order, trailer excluded.
    pub lines: Vec<String>,
    pub footnotes: Vec<FootnoteRecord>,
    pub stats: ConversionStats,
}

impl OrgDocument {
    /// Body lines followed by the footnote trailer.
    pub fn all_lines(&self) -> Vec<String> {
        let mut lines = self.lines.clone();
        lines.extend(footnote_trailer(&self.footnotes));
        lines
    }

    /// Final Org text, one blank line between adjacent lines.
    pub fn render(&self) -> String {
        self.all_lines().join(PARAGRAPH_SEPARATOR)
    }
}
