use std::collections::HashMap;

use crate::docx::xml::{find_attr, parse_i32_attr, parse_w_bool, parse_xml_part, XmlEvent};

pub const STYLES_PART: &str = "word/styles.xml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleType {
    #[default]
    Paragraph,
    Character,
    Other,
}

#[derive(Clone, Debug, Default)]
pub struct StyleDef {
    pub id: String,
    pub name: Option<String>,
    pub style_type: StyleType,
    pub is_default: bool,
    pub ilvl: Option<i32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl StyleDef {
    /// Display name, falling back to the id when the style has no `w:name`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// `word/styles.xml`, reduced to what the converter reads.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    styles: HashMap<String, StyleDef>,
    default_paragraph: Option<String>,
}

impl StyleSheet {
    pub fn parse(xml: &[u8]) -> anyhow::Result<Self> {
        let part = parse_xml_part(STYLES_PART, xml)?;
        let mut sheet = Self::default();
        let mut stack: Vec<String> = Vec::new();
        let mut current: Option<StyleDef> = None;

        for ev in &part.events {
            match ev {
                XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs } => {
                    let parent = stack.last().map(|s| s.as_str()).unwrap_or("");
                    if name == "w:style" {
                        current = Some(StyleDef {
                            id: find_attr(attrs, "w:styleId").unwrap_or("").to_string(),
                            style_type: match find_attr(attrs, "w:type") {
                                Some("paragraph") | None => StyleType::Paragraph,
                                Some("character") => StyleType::Character,
                                Some(_) => StyleType::Other,
                            },
                            is_default: find_attr(attrs, "w:default")
                                .is_some_and(|v| v == "1" || v == "true"),
                            ..Default::default()
                        });
                    } else if let Some(def) = current.as_mut() {
                        match (name.as_str(), parent) {
                            ("w:name", "w:style") => {
                                def.name = find_attr(attrs, "w:val").map(str::to_string);
                            }
                            ("w:ilvl", "w:numPr") => {
                                def.ilvl = parse_i32_attr(attrs, "w:val");
                            }
                            ("w:b", "w:rPr") => def.bold = Some(parse_w_bool(attrs)),
                            ("w:i", "w:rPr") => def.italic = Some(parse_w_bool(attrs)),
                            _ => {}
                        }
                    }
                    if matches!(ev, XmlEvent::Start { .. }) {
                        stack.push(name.clone());
                    } else if name == "w:style" {
                        sheet.finish_style(current.take());
                    }
                }
                XmlEvent::End { name } => {
                    if name == "w:style" {
                        sheet.finish_style(current.take());
                    }
                    stack.pop();
                }
                XmlEvent::Text { .. } => {}
            }
        }
        Ok(sheet)
    }

    fn finish_style(&mut self, def: Option<StyleDef>) {
        let Some(def) = def else {
            return;
        };
        if def.id.is_empty() {
            return;
        }
        if def.is_default && def.style_type == StyleType::Paragraph {
            self.default_paragraph = Some(def.id.clone());
        }
        self.styles.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&StyleDef> {
        self.styles.get(id)
    }

    pub fn default_paragraph_style(&self) -> Option<&StyleDef> {
        self.default_paragraph.as_deref().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
