use crate::docx::model::{NoteKind, NoteRef, NumberingProps, Paragraph, ParagraphStyle, Run};
use crate::docx::styles::StyleSheet;
use crate::docx::xml::{find_attr, parse_i32_attr, parse_w_bool, XmlEvent, XmlPart};

#[derive(Default)]
struct RunCapture {
    stack_len: usize,
    text: String,
    bold: Option<bool>,
    italic: Option<bool>,
    r_style: Option<String>,
    note_refs: Vec<NoteRef>,
    rpr_stack_len: Option<usize>,
    w_t_stack_len: Option<usize>,
}

#[derive(Default)]
struct ParaCapture {
    p_stack_len: usize,
    ppr_stack_len: Option<usize>,
    hyperlink_stack_len: Option<usize>,
    p_style: Option<String>,
    alignment: Option<String>,
    numbering: Option<NumberingProps>,
    runs: Vec<Run>,
    run: Option<RunCapture>,
}

fn control_append(buf: &mut String, name: &str, attrs: &[(String, String)]) {
    match name {
        "w:tab" | "w:ptab" => buf.push('\t'),
        "w:cr" => buf.push('\n'),
        "w:br" => {
            if find_attr(attrs, "w:type").unwrap_or("textWrapping") == "textWrapping" {
                buf.push('\n');
            }
        }
        "w:noBreakHyphen" => buf.push('-'),
        _ => {}
    }
}

/// Body paragraphs of `word/document.xml`, in document order.
///
/// Only direct `w:p` children of `w:body` count; paragraphs nested in tables,
/// text boxes or other containers are not part of the outline.
pub fn extract_body_paragraphs(part: &XmlPart, styles: &StyleSheet) -> Vec<Paragraph> {
    let mut out: Vec<Paragraph> = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut capturing: Option<ParaCapture> = None;

    for ev in &part.events {
        match ev {
            XmlEvent::Start { name, attrs } => {
                let parent = stack.last().map(|s| s.as_str()).unwrap_or("");
                if name == "w:p" && parent == "w:body" && capturing.is_none() {
                    capturing = Some(ParaCapture {
                        p_stack_len: stack.len() + 1,
                        ..Default::default()
                    });
                } else if let Some(cap) = capturing.as_mut() {
                    open_element(cap, name, attrs, parent, stack.len(), false);
                }
                stack.push(name.clone());
            }
            XmlEvent::Empty { name, attrs } => {
                let parent = stack.last().map(|s| s.as_str()).unwrap_or("");
                if name == "w:p" && parent == "w:body" && capturing.is_none() {
                    out.push(Paragraph::default());
                } else if let Some(cap) = capturing.as_mut() {
                    open_element(cap, name, attrs, parent, stack.len(), true);
                }
            }
            XmlEvent::Text { text } => {
                if let Some(run) = capturing.as_mut().and_then(|c| c.run.as_mut()) {
                    if run.w_t_stack_len == Some(stack.len()) {
                        run.text.push_str(text);
                    }
                }
            }
            XmlEvent::End { name } => {
                if let Some(cap) = capturing.as_mut() {
                    close_element(cap, name, stack.len(), styles);
                    if name == "w:p" && stack.len() == cap.p_stack_len {
                        if let Some(cap) = capturing.take() {
                            out.push(finalize_paragraph(cap, styles));
                        }
                    }
                }
                stack.pop();
            }
        }
    }
    out
}

fn open_element(
    cap: &mut ParaCapture,
    name: &str,
    attrs: &[(String, String)],
    parent: &str,
    depth: usize,
    empty: bool,
) {
    let direct_child = depth == cap.p_stack_len;
    match name {
        "w:pPr" if direct_child => {
            if !empty {
                cap.ppr_stack_len = Some(depth + 1);
            }
            return;
        }
        "w:hyperlink" if direct_child => {
            if !empty {
                cap.hyperlink_stack_len = Some(depth + 1);
            }
            return;
        }
        "w:r" if direct_child || cap.hyperlink_stack_len == Some(depth) => {
            let run = RunCapture {
                stack_len: depth + 1,
                ..Default::default()
            };
            if empty {
                cap.runs.push(Run::default());
            } else {
                cap.run = Some(run);
            }
            return;
        }
        _ => {}
    }

    if let Some(ppr) = cap.ppr_stack_len {
        if depth >= ppr && cap.run.is_none() {
            read_paragraph_property(cap, name, attrs, parent, depth == ppr);
            return;
        }
    }

    let Some(run) = cap.run.as_mut() else {
        return;
    };
    let run_child = depth == run.stack_len;
    match name {
        "w:rPr" if run_child => {
            if !empty {
                run.rpr_stack_len = Some(depth + 1);
            }
        }
        "w:t" if run_child => {
            if !empty {
                run.w_t_stack_len = Some(depth + 1);
            }
        }
        "w:tab" | "w:ptab" | "w:cr" | "w:br" | "w:noBreakHyphen" if run_child => {
            control_append(&mut run.text, name, attrs);
        }
        "w:footnoteReference" | "w:endnoteReference" if run_child => {
            let kind = if name == NoteKind::Footnote.reference_name() {
                NoteKind::Footnote
            } else {
                NoteKind::Endnote
            };
            if let Some(id) = find_attr(attrs, "w:id") {
                run.note_refs.push(NoteRef {
                    kind,
                    id: id.trim().to_string(),
                });
            }
        }
        _ if run.rpr_stack_len == Some(depth) => match name {
            "w:b" => run.bold = Some(parse_w_bool(attrs)),
            "w:i" => run.italic = Some(parse_w_bool(attrs)),
            "w:rStyle" => run.r_style = find_attr(attrs, "w:val").map(str::to_string),
            _ => {}
        },
        _ => {}
    }
}

fn read_paragraph_property(
    cap: &mut ParaCapture,
    name: &str,
    attrs: &[(String, String)],
    parent: &str,
    in_ppr: bool,
) {
    match name {
        "w:pStyle" if in_ppr => {
            if let Some(v) = find_attr(attrs, "w:val") {
                let v = v.trim();
                if !v.is_empty() {
                    cap.p_style = Some(v.to_string());
                }
            }
        }
        "w:jc" if in_ppr => {
            cap.alignment = find_attr(attrs, "w:val").map(|v| v.trim().to_string());
        }
        "w:numPr" if in_ppr => {
            cap.numbering.get_or_insert_with(NumberingProps::default);
        }
        "w:ilvl" if parent == "w:numPr" => {
            let num = cap.numbering.get_or_insert_with(NumberingProps::default);
            if num.ilvl.is_none() {
                num.ilvl = parse_i32_attr(attrs, "w:val");
            }
        }
        "w:numId" if parent == "w:numPr" => {
            let num = cap.numbering.get_or_insert_with(NumberingProps::default);
            if num.num_id.is_none() {
                num.num_id = find_attr(attrs, "w:val").map(|v| v.trim().to_string());
            }
        }
        _ => {}
    }
}

fn close_element(cap: &mut ParaCapture, name: &str, depth: usize, styles: &StyleSheet) {
    match name {
        "w:pPr" if cap.ppr_stack_len == Some(depth) => cap.ppr_stack_len = None,
        "w:hyperlink" if cap.hyperlink_stack_len == Some(depth) => cap.hyperlink_stack_len = None,
        "w:t" => {
            if let Some(run) = cap.run.as_mut() {
                if run.w_t_stack_len == Some(depth) {
                    run.w_t_stack_len = None;
                }
            }
        }
        "w:rPr" => {
            if let Some(run) = cap.run.as_mut() {
                if run.rpr_stack_len == Some(depth) {
                    run.rpr_stack_len = None;
                }
            }
        }
        "w:r" => {
            if cap.run.as_ref().is_some_and(|r| r.stack_len == depth) {
                if let Some(run) = cap.run.take() {
                    cap.runs.push(finalize_run(run, styles));
                }
            }
        }
        _ => {}
    }
}

fn finalize_run(run: RunCapture, styles: &StyleSheet) -> Run {
    let char_style = run.r_style.as_deref().and_then(|id| styles.get(id));
    Run {
        text: run.text,
        bold: run
            .bold
            .or_else(|| char_style.and_then(|s| s.bold))
            .unwrap_or(false),
        italic: run
            .italic
            .or_else(|| char_style.and_then(|s| s.italic))
            .unwrap_or(false),
        note_refs: run.note_refs,
    }
}

fn finalize_paragraph(cap: ParaCapture, styles: &StyleSheet) -> Paragraph {
    let style_def = match cap.p_style.as_deref() {
        Some(id) => styles.get(id),
        None => styles.default_paragraph_style(),
    };
    let style = match (style_def, cap.p_style) {
        (Some(def), _) => Some(ParagraphStyle {
            id: def.id.clone(),
            name: def.display_name().to_string(),
            ilvl: def.ilvl,
        }),
        // Style referenced but not defined in styles.xml: the id is all we have.
        (None, Some(id)) => Some(ParagraphStyle {
            name: id.clone(),
            id,
            ilvl: None,
        }),
        (None, None) => None,
    };
    Paragraph {
        style,
        alignment: cap.alignment,
        numbering: cap.numbering,
        runs: cap.runs,
    }
}

#[cfg(test)]
mod tests {
    use super::extract_body_paragraphs;
    use crate::docx::model::NoteKind;
    use crate::docx::styles::StyleSheet;
    use crate::docx::xml::parse_xml_part;

    const DOC: &[u8] = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
<w:p><w:pPr><w:numPr><w:ilvl w:val="2"/><w:numId w:val="7"/></w:numPr></w:pPr>
  <w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Bold </w:t></w:r>
  <w:r><w:t>plain</w:t><w:tab/><w:t>x</w:t></w:r>
  <w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteReference w:id="4"/></w:r>
  <w:hyperlink r:id="rId9"><w:r><w:t>link</w:t></w:r></w:hyperlink>
</w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p/>
</w:body></w:document>"#;

    #[test]
    fn reads_paragraph_properties_and_runs() {
        let part = parse_xml_part("word/document.xml", DOC).expect("parse document");
        let paras = extract_body_paragraphs(&part, &StyleSheet::default());
        assert_eq!(paras.len(), 3);

        let head = &paras[0];
        assert_eq!(head.style.as_ref().map(|s| s.name.as_str()), Some("Heading1"));
        assert_eq!(head.alignment.as_deref(), Some("center"));
        assert_eq!(head.runs.len(), 1);
        assert!(!head.runs[0].bold, "paragraph mark formatting is not run formatting");

        let item = &paras[1];
        let num = item.numbering.as_ref().expect("numbering");
        assert_eq!(num.num_id.as_deref(), Some("7"));
        assert_eq!(num.ilvl, Some(2));
        assert_eq!(item.runs.len(), 4);
        assert!(item.runs[0].bold);
        assert_eq!(item.runs[1].text, "plain\tx");
        assert_eq!(item.runs[2].note_refs[0].kind, NoteKind::Footnote);
        assert_eq!(item.runs[2].note_refs[0].id, "4");
        assert_eq!(item.text(), "Bold plain\txlink");

        assert!(paras[2].runs.is_empty());
    }
}
