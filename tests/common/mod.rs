#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub fn document_xml(body: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr/></w:body></w:document>"#)
}

pub fn styles_xml(styles: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="{W_NS}">{styles}</w:styles>"#)
}

pub fn notes_xml(kind: &str, notes: &[(&str, &str)]) -> String {
    let mut body = format!(
        r#"<w:{kind} w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:{kind}><w:{kind} w:type="continuationSeparator" w:id="0"><w:p><w:r><w:continuationSeparator/></w:r></w:p></w:{kind}>"#
    );
    for (id, text) in notes {
        body.push_str(&format!(
            r#"<w:{kind} w:id="{id}"><w:p><w:r><w:{kind}Ref/></w:r><w:r><w:t xml:space="preserve"> {text}</w:t></w:r></w:p></w:{kind}>"#
        ));
    }
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:{kind}s xmlns:w="{W_NS}">{body}</w:{kind}s>"#)
}

pub fn rels_xml(rels: &[(&str, &str, &str)]) -> String {
    let items: String = rels
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{id}" Type="{REL_NS}/{kind}" Target="{target}"/>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{items}</Relationships>"#
    )
}

/// Write a `.docx` made of the given parts.
pub fn write_docx(path: &Path, parts: &[(&str, String)]) -> PathBuf {
    let file = File::create(path).expect("create docx");
    let mut z = ZipWriter::new(file);
    for (name, data) in parts {
        z.start_file(*name, SimpleFileOptions::default())
            .expect("start file");
        z.write_all(data.as_bytes()).expect("write part");
    }
    z.finish().expect("finish zip");
    path.to_path_buf()
}

/// Minimal document: just a body.
pub fn write_simple_docx(path: &Path, body: &str) -> PathBuf {
    write_docx(path, &[("word/document.xml", document_xml(body))])
}

pub fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}
