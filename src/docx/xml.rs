use anyhow::Context;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlEvent {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Empty {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text {
        text: String,
    },
}

#[derive(Clone, Debug)]
pub struct XmlPart {
    pub name: String,
    pub events: Vec<XmlEvent>,
}

/// A part parsed as far as the XML allowed. `error` is set when parsing
/// stopped early; `events` then holds everything read before the failure.
pub struct PartialXmlPart {
    pub part: XmlPart,
    pub error: Option<anyhow::Error>,
}

pub fn parse_xml_part(name: &str, xml_bytes: &[u8]) -> anyhow::Result<XmlPart> {
    let PartialXmlPart { part, error } = parse_xml_part_partial(name, xml_bytes);
    match error {
        Some(err) => Err(err.context(format!("parse xml: {name}"))),
        None => Ok(part),
    }
}

pub fn parse_xml_part_partial(name: &str, xml_bytes: &[u8]) -> PartialXmlPart {
    let mut events: Vec<XmlEvent> = Vec::new();
    let error = read_events(xml_bytes, &mut events).err();
    PartialXmlPart {
        part: XmlPart {
            name: name.to_string(),
            events,
        },
        error,
    }
}

fn read_events(xml_bytes: &[u8], events: &mut Vec<XmlEvent>) -> anyhow::Result<()> {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    loop {
        buf.clear();
        let ev = reader.read_event_into(&mut buf).with_context(|| {
            format!("read xml event at byte {}", reader.buffer_position())
        })?;
        match ev {
            Event::Eof => break,
            Event::Start(s) => {
                events.push(XmlEvent::Start {
                    name: bytes_to_string(s.name().as_ref()),
                    attrs: collect_attrs(&s)?,
                });
            }
            Event::End(e) => {
                events.push(XmlEvent::End {
                    name: bytes_to_string(e.name().as_ref()),
                });
            }
            Event::Empty(s) => {
                events.push(XmlEvent::Empty {
                    name: bytes_to_string(s.name().as_ref()),
                    attrs: collect_attrs(&s)?,
                });
            }
            Event::Text(t) => {
                let txt = t.unescape().context("unescape text")?.into_owned();
                events.push(XmlEvent::Text { text: txt });
            }
            Event::CData(t) => {
                events.push(XmlEvent::Text {
                    text: bytes_to_string(t.into_inner()),
                });
            }
            // Declarations, comments, processing instructions and doctypes carry no content.
            _ => {}
        }
    }
    Ok(())
}

fn collect_attrs(s: &BytesStart<'_>) -> anyhow::Result<Vec<(String, String)>> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for a in s.attributes() {
        let a = a.context("attr")?;
        let key = bytes_to_string(a.key.as_ref());
        let val = a
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| bytes_to_string(a.value.as_ref()));
        attrs.push((key, val));
    }
    Ok(attrs)
}

fn bytes_to_string(bytes: impl AsRef<[u8]>) -> String {
    String::from_utf8_lossy(bytes.as_ref()).into_owned()
}

pub fn find_attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn parse_i32_attr(attrs: &[(String, String)], key: &str) -> Option<i32> {
    find_attr(attrs, key).and_then(|v| v.trim().parse::<i32>().ok())
}

/// WordprocessingML toggle property (`<w:b/>`, `<w:b w:val="0"/>`, ...).
pub fn parse_w_bool(attrs: &[(String, String)]) -> bool {
    if let Some(v) = find_attr(attrs, "w:val") {
        let s = v.trim().to_ascii_lowercase();
        return !(s == "0" || s == "false" || s == "off" || s == "none");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{parse_w_bool, parse_xml_part, parse_xml_part_partial, XmlEvent};

    #[test]
    fn text_is_unescaped_and_whitespace_kept() {
        let xml = br#"<w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r>"#;
        let part = parse_xml_part("t.xml", xml).expect("parse xml");
        assert!(part.events.contains(&XmlEvent::Text {
            text: " a & b ".to_string()
        }));
    }

    #[test]
    fn partial_parse_keeps_events_before_error() {
        let xml = br#"<root><a/><b></c></root>"#;
        let partial = parse_xml_part_partial("bad.xml", xml);
        assert!(partial.error.is_some());
        assert!(partial
            .part
            .events
            .iter()
            .any(|e| matches!(e, XmlEvent::Empty { name, .. } if name == "a")));
    }

    #[test]
    fn toggle_values() {
        let off = vec![("w:val".to_string(), "false".to_string())];
        let on = vec![("w:val".to_string(), "1".to_string())];
        assert!(!parse_w_bool(&off));
        assert!(parse_w_bool(&on));
        assert!(parse_w_bool(&[]));
    }
}
