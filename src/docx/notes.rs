use crate::docx::model::{NoteElement, NoteEntry, NoteKind};
use crate::docx::xml::{find_attr, parse_xml_part_partial, XmlEvent};
use crate::error::NotesError;

struct NoteCapture {
    index: usize,
    stack_len: usize,
    id: Option<String>,
    note_type: Option<String>,
    text_nodes: Vec<String>,
    w_t_stack_len: Option<usize>,
}

impl NoteCapture {
    fn finish(self, kind: NoteKind) -> NoteEntry {
        match self.id {
            Some(id) => Ok(NoteElement {
                id,
                note_type: self.note_type,
                text_nodes: self.text_nodes,
            }),
            None => Err(NotesError::MalformedNote {
                kind,
                index: self.index,
                detail: "missing w:id".to_string(),
            }),
        }
    }
}

/// Note elements of a footnotes/endnotes part, in source order.
///
/// A note that cannot be read becomes an `Err` entry. When the XML itself
/// breaks off, the notes completed before the break are kept and the note
/// being read at that point is reported as malformed.
pub fn parse_note_part(kind: NoteKind, part_name: &str, xml: &[u8]) -> Vec<NoteEntry> {
    let partial = parse_xml_part_partial(part_name, xml);
    let element = kind.element_name();

    let mut out: Vec<NoteEntry> = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<NoteCapture> = None;
    let mut seen = 0usize;

    for ev in &partial.part.events {
        match ev {
            XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs } => {
                let is_start = matches!(ev, XmlEvent::Start { .. });
                if name == element && current.is_none() {
                    let cap = NoteCapture {
                        index: seen,
                        stack_len: stack.len() + 1,
                        id: find_attr(attrs, "w:id").map(|v| v.trim().to_string()),
                        note_type: find_attr(attrs, "w:type").map(str::to_string),
                        text_nodes: Vec::new(),
                        w_t_stack_len: None,
                    };
                    seen += 1;
                    if is_start {
                        current = Some(cap);
                    } else {
                        out.push(cap.finish(kind));
                    }
                } else if let Some(cap) = current.as_mut() {
                    if name == "w:t" && is_start {
                        cap.w_t_stack_len = Some(stack.len() + 1);
                    }
                }
                if is_start {
                    stack.push(name.clone());
                }
            }
            XmlEvent::Text { text } => {
                if let Some(cap) = current.as_mut() {
                    if cap.w_t_stack_len == Some(stack.len()) {
                        cap.text_nodes.push(text.clone());
                    }
                }
            }
            XmlEvent::End { name } => {
                if let Some(cap) = current.as_mut() {
                    if name == "w:t" && cap.w_t_stack_len == Some(stack.len()) {
                        cap.w_t_stack_len = None;
                    } else if name == element && cap.stack_len == stack.len() {
                        if let Some(cap) = current.take() {
                            out.push(cap.finish(kind));
                        }
                    }
                }
                stack.pop();
            }
        }
    }

    if let Some(err) = partial.error {
        let detail = format!("{err:#}");
        match current {
            Some(cap) => out.push(Err(NotesError::MalformedNote {
                kind,
                index: cap.index,
                detail,
            })),
            None => out.push(Err(NotesError::Malformed { kind, detail })),
        }
    }
    out
}
