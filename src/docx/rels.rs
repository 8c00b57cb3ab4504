use crate::docx::model::NoteKind;
use crate::docx::xml::{find_attr, parse_xml_part, XmlEvent};

pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Relationships of the main document part.
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    pub items: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &[u8]) -> anyhow::Result<Self> {
        let part = parse_xml_part(DOCUMENT_RELS_PART, xml)?;
        let mut items = Vec::new();
        for ev in &part.events {
            let (XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs }) = ev else {
                continue;
            };
            if name != "Relationship" {
                continue;
            }
            let (Some(id), Some(rel_type), Some(target)) = (
                find_attr(attrs, "Id"),
                find_attr(attrs, "Type"),
                find_attr(attrs, "Target"),
            ) else {
                continue;
            };
            items.push(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                external: find_attr(attrs, "TargetMode")
                    .is_some_and(|m| m.eq_ignore_ascii_case("external")),
            });
        }
        Ok(Self { items })
    }

    /// Type URIs differ between transitional and strict OOXML; both end in the same segment.
    pub fn find_by_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        let suffix = format!("/{suffix}");
        self.items
            .iter()
            .find(|r| !r.external && r.rel_type.ends_with(&suffix))
    }

    /// Package path of the part holding notes of `kind`, if related.
    pub fn note_part_path(&self, kind: NoteKind) -> Option<String> {
        let suffix = match kind {
            NoteKind::Footnote => "footnotes",
            NoteKind::Endnote => "endnotes",
        };
        self.find_by_type_suffix(suffix)
            .map(|r| resolve_target("word", &r.target))
    }
}

/// Resolve a relationship target against the directory of the source part.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(abs) = target.strip_prefix('/') {
        return abs.to_string();
    }
    let mut segs: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segs.pop();
            }
            s => segs.push(s),
        }
    }
    segs.join("/")
}

pub fn default_note_part_path(kind: NoteKind) -> &'static str {
    match kind {
        NoteKind::Footnote => "word/footnotes.xml",
        NoteKind::Endnote => "word/endnotes.xml",
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_target, Relationships};
    use crate::docx::model::NoteKind;

    #[test]
    fn finds_note_parts_by_type() {
        let xml = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes" Target="notes/fn.xml"/>
</Relationships>"#;
        let rels = Relationships::parse(xml).expect("parse rels");
        assert_eq!(
            rels.note_part_path(NoteKind::Footnote).as_deref(),
            Some("word/notes/fn.xml")
        );
        assert_eq!(rels.note_part_path(NoteKind::Endnote), None);
    }

    #[test]
    fn targets_resolve_relative_and_absolute() {
        assert_eq!(resolve_target("word", "footnotes.xml"), "word/footnotes.xml");
        assert_eq!(resolve_target("word", "../custom/x.xml"), "custom/x.xml");
        assert_eq!(resolve_target("word", "/word/endnotes.xml"), "word/endnotes.xml");
    }
}
