#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A Word-like package: heading paragraphs get a Heading1 style, others are plain.
pub fn manuscript(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|text| {
            if text.is_empty() {
                "<w:p/>".to_string()
            } else if text.chars().any(|c| c.is_alphabetic()) && text.to_uppercase() == *text {
                format!(
                    r#"<w:p w:rsidR="00B2"><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
                    text
                )
            } else {
                format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
            }
        })
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
        W_NS, body
    );
    with_main_part(&document)
}

/// A package around a hand-written `word/document.xml`.
pub fn with_main_part(document: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document),
    ] {
        writer.start_file(name, FileOptions::default()).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Raw text of one part of a package.
pub fn part(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

/// (id, body text) of every comment in the output's comments part.
pub fn comments(bytes: &[u8]) -> Vec<(String, String)> {
    let Some(xml) = part(bytes, "word/comments.xml") else {
        return Vec::new();
    };
    let doc = roxmltree::Document::parse(&xml).unwrap();
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name((W_NS, "comment")))
        .map(|c| {
            let id = c.attribute((W_NS, "id")).unwrap_or_default().to_string();
            let text: String = c
                .descendants()
                .filter(|n| n.has_tag_name((W_NS, "t")))
                .filter_map(|n| n.text())
                .collect();
            (id, text)
        })
        .collect()
}

/// Element names of the body paragraph at `index`, in order.
pub fn paragraph_children(bytes: &[u8], index: usize) -> Vec<(String, Option<String>)> {
    let xml = part(bytes, "word/document.xml").unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let body = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .unwrap();
    let paragraph = body
        .children()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .nth(index)
        .unwrap();
    paragraph
        .children()
        .filter(|n| n.is_element())
        .map(|n| {
            let id = n
                .attribute((W_NS, "id"))
                .or_else(|| {
                    n.children()
                        .find(|c| c.has_tag_name((W_NS, "commentReference")))
                        .and_then(|c| c.attribute((W_NS, "id")))
                })
                .map(str::to_string);
            (n.tag_name().name().to_string(), id)
        })
        .collect()
}
