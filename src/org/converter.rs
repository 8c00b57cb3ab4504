use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::docx::document::WordDocument;
use crate::docx::model::DocumentSource;
use crate::org::classify::{classify, Classification};
use crate::org::emit::{emit_lines, OrgDocument};
use crate::org::footnotes::FootnoteTable;
use crate::org::lists::ListState;
use crate::org::refs::resolve_references;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub paragraphs: usize,
    pub emitted_lines: usize,
    pub footnotes: usize,
    pub resolved_refs: usize,
    /// References whose note was not extracted. Their tokens are dropped.
    pub unresolved_refs: usize,
    pub list_items: usize,
    pub headings: usize,
}

/// Convert one document. All state (note table, list stacks) lives in this
/// call, so documents can be converted concurrently.
pub fn convert_document(doc: &dyn DocumentSource) -> OrgDocument {
    let table = FootnoteTable::extract(doc);
    let mut lists = ListState::default();
    let mut stats = ConversionStats {
        footnotes: table.len(),
        ..Default::default()
    };
    let mut lines = Vec::new();

    for paragraph in doc.paragraphs() {
        stats.paragraphs += 1;
        let refs = resolve_references(paragraph, &table);
        stats.resolved_refs += refs.markers.len();
        stats.unresolved_refs += refs.unresolved.len();

        // Blank paragraphs leave the list context untouched.
        let Some(classification) = classify(paragraph, &refs) else {
            continue;
        };

        let number = match &classification {
            Classification::ListItem { kind, level, .. } => {
                stats.list_items += 1;
                lists.push_item(*kind, *level)
            }
            other => {
                if matches!(
                    other,
                    Classification::Heading { .. } | Classification::CenteredHeading { .. }
                ) {
                    stats.headings += 1;
                }
                lists.clear();
                None
            }
        };
        lines.extend(emit_lines(&classification, number));
    }

    stats.emitted_lines = lines.len();
    if stats.unresolved_refs > 0 {
        debug!(
            unresolved = stats.unresolved_refs,
            "note references without a matching note were dropped"
        );
    }
    OrgDocument {
        lines,
        footnotes: table.records().to_vec(),
        stats,
    }
}

/// Convert `input` and write the Org text to `output`, creating parent directories.
pub fn convert_file(input: &Path, output: &Path) -> Result<ConversionStats> {
    let doc = WordDocument::open(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let org = convert_document(&doc);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(output, org.render())
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        lines = org.stats.emitted_lines,
        footnotes = org.stats.footnotes,
        "converted"
    );
    Ok(org.stats)
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;
    use regex::Regex;

    use super::convert_document;
    use crate::docx::model::{MemoryDocument, NoteKind, Paragraph, Run};
    use crate::org::classify::detect_list;
    use crate::org::emit::FOOTNOTES_HEADING;

    static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[fn:\d+\]").expect("token"));

    fn plain(text: &str) -> Paragraph {
        Paragraph::from_runs(vec![Run::plain(text)])
    }

    fn hello_world() -> Paragraph {
        Paragraph::from_runs(vec![
            Run::plain("Hello "),
            Run::bold("World").with_note_ref(NoteKind::Footnote, "12"),
        ])
    }

    fn three_notes(doc: MemoryDocument) -> MemoryDocument {
        doc.with_notes(
            NoteKind::Footnote,
            vec![("4", "four"), ("8", "eight"), ("12", "twelve")],
        )
    }

    #[test]
    fn bold_reference_surfaces_in_bold_line() {
        let doc = three_notes(MemoryDocument::new(vec![hello_world()]));
        let org = convert_document(&doc);
        assert_eq!(
            org.lines,
            vec!["** World[fn:3]".to_string(), "Hello ".to_string()]
        );
        assert_eq!(org.stats.resolved_refs, 1);
        assert!(org
            .render()
            .ends_with("* Footnotes\n\n[fn:1] four\n\n[fn:2] eight\n\n[fn:3] twelve"));
    }

    #[test]
    fn no_notes_means_no_trailer_or_tokens() {
        let doc = MemoryDocument::new(vec![hello_world(), plain("more")]);
        let org = convert_document(&doc);
        let text = org.render();
        assert!(!text.contains(FOOTNOTES_HEADING));
        assert!(!text.contains("[fn:"));
        assert_eq!(org.stats.unresolved_refs, 1);
    }

    #[test]
    fn stripping_tokens_matches_note_free_output() {
        let paragraphs = vec![
            Paragraph::from_runs(vec![Run::plain("Intro").with_note_ref(NoteKind::Footnote, "4")])
                .with_style("Heading1", "heading 1"),
            hello_world(),
            Paragraph::from_runs(vec![
                Run::plain("1. first"),
                Run::plain("").with_note_ref(NoteKind::Footnote, "8"),
            ]),
        ];
        let with_notes = convert_document(&three_notes(MemoryDocument::new(paragraphs.clone())));
        let without = convert_document(&MemoryDocument::new(paragraphs));

        let stripped: Vec<String> = with_notes
            .lines
            .iter()
            .map(|l| TOKEN_RE.replace_all(l, "").into_owned())
            .collect();
        assert_eq!(stripped, without.lines);
        assert_eq!(with_notes.lines[0], "* Intro[fn:1]");
    }

    #[test]
    fn endnotes_number_after_footnotes() {
        let doc = MemoryDocument::new(vec![Paragraph::from_runs(vec![
            Run::plain("a").with_note_ref(NoteKind::Endnote, "1"),
            Run::plain("b").with_note_ref(NoteKind::Footnote, "1"),
        ])])
        .with_notes(NoteKind::Footnote, vec![("1", "foot")])
        .with_notes(NoteKind::Endnote, vec![("1", "end")]);
        let org = convert_document(&doc);
        assert_eq!(org.lines, vec!["a[fn:2]b[fn:1]".to_string()]);
    }

    #[test]
    fn prose_between_list_items_restarts_numbering() {
        let doc = MemoryDocument::new(vec![
            plain("1. one"),
            plain("2. two"),
            plain("between"),
            plain("3. three"),
            plain("- dash"),
            plain("4. four"),
        ]);
        let org = convert_document(&doc);
        assert_eq!(
            org.lines,
            vec!["1. one", "2. two", "between", "1. three", "- dash", "1. four"]
        );
        assert_eq!(org.stats.list_items, 5);
    }

    #[test]
    fn blank_paragraphs_do_not_break_lists() {
        let doc = MemoryDocument::new(vec![plain("1. one"), plain("   "), plain("2. two")]);
        let org = convert_document(&doc);
        assert_eq!(org.lines, vec!["1. one", "2. two"]);
        assert_eq!(org.stats.paragraphs, 3);
    }

    #[test]
    fn nested_numbered_styles() {
        let item = |text: &str, level: i32| {
            plain(text)
                .with_style("ListParagraph", "List Paragraph")
                .with_numbering(Some("1"), Some(level))
        };
        let doc = MemoryDocument::new(vec![
            item("a", 0),
            item("b", 1),
            item("c", 2),
            item("d", 0),
            item("e", 1),
        ]);
        let org = convert_document(&doc);
        assert_eq!(org.lines, vec!["1. a", "  1. b", "    1. c", "2. d", "  1. e"]);
    }

    #[test]
    fn reconverting_output_adds_only_text_pattern_lists() {
        let doc = MemoryDocument::new(vec![
            plain("Overview").with_style("Heading2", "heading 2"),
            plain("Centered").with_alignment("center"),
            plain("1. numbered"),
            plain("prose"),
        ]);
        let first = convert_document(&doc);
        let reparsed: Vec<Paragraph> = first.lines.iter().map(|l| plain(l)).collect();
        let expected_lists = reparsed.iter().filter(|p| detect_list(p).is_some()).count();

        let second = convert_document(&MemoryDocument::new(reparsed));
        assert_eq!(second.stats.headings, 0);
        assert_eq!(second.stats.list_items, expected_lists);
        assert_eq!(second.lines[3], "prose");
    }

    #[test]
    fn huge_indent_level_stays_bounded() {
        let doc = MemoryDocument::new(vec![
            plain("deep").with_numbering(Some("1"), Some(i32::MAX)),
            plain("top").with_numbering(Some("1"), Some(0)),
        ]);
        let org = convert_document(&doc);
        assert_eq!(
            org.lines,
            vec![format!("{}1. deep", "  ".repeat(8)), "1. top".to_string()]
        );
    }

    #[test]
    fn each_call_starts_with_fresh_state() {
        let doc = MemoryDocument::new(vec![plain("1. one"), plain("2. two")]);
        let a = convert_document(&doc);
        let b = convert_document(&doc);
        assert_eq!(a.lines, b.lines);
    }
}
