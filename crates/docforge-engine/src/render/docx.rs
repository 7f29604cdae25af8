//! DOCX renderer
//!
//! Writes a minimal WordprocessingML package: content types, package
//! relationships, `word/document.xml`, `word/styles.xml` and the document
//! relationships. Each tree section opens with a bookmark named
//! `section_<n>` so section boundaries survive in the binary output.

use std::fmt::Write as _;
use std::io::{Cursor, Read, Write};

use docforge_types::{DocumentTree, Node, TableNode, TreeStats};
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::clamp_level;
use crate::errors::EngineError;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A4 text width in twips with 1" margins
const TEXT_WIDTH_TWIPS: usize = 9026;

/// Header row fill colour
const HEADER_FILL: &str = "D9D9D9";

const HEADING_STYLES: u8 = 9;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Serialize the tree to DOCX bytes
pub fn render_docx(tree: &DocumentTree) -> Result<Vec<u8>, EngineError> {
    let document = document_xml(tree);
    let styles = styles_xml();

    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/document.xml", &document),
        ("word/styles.xml", &styles),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
    ];

    // Fixed timestamps keep the output byte-for-byte reproducible
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Read one part of a DOCX package as text
pub fn read_part(docx: &[u8], name: &str) -> Result<String, EngineError> {
    let mut archive = ZipArchive::new(Cursor::new(docx))?;
    let mut file = archive.by_name(name)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

/// Count the structures present in a rendered DOCX
///
/// Used to check the binary output against the tree and the HTML preview.
pub fn docx_stats(docx: &[u8]) -> Result<TreeStats, EngineError> {
    let xml = read_part(docx, "word/document.xml")?;
    let header_rows = xml.matches("<w:tblHeader/>").count();
    Ok(TreeStats {
        sections: xml.matches("<w:bookmarkStart ").count(),
        headings: xml.matches("<w:pStyle w:val=\"Heading").count(),
        paragraphs: xml.matches("<w:pStyle w:val=\"BodyText\"/>").count(),
        tables: xml.matches("<w:tbl>").count(),
        rows: xml.matches("<w:tr>").count() - header_rows - xml.matches("<w:hidden/>").count(),
    })
}

fn document_xml(tree: &DocumentTree) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    let _ = write!(out, "<w:document xmlns:w=\"{}\" xmlns:r=\"{}\"><w:body>", W_NS, R_NS);

    for (index, section) in tree.sections.iter().enumerate() {
        let name = match &section.id {
            Some(id) => format!("section_{}_{}", index + 1, bookmark_safe(id)),
            None => format!("section_{}", index + 1),
        };
        let _ = write!(
            out,
            "<w:bookmarkStart w:id=\"{index}\" w:name=\"{}\"/><w:bookmarkEnd w:id=\"{index}\"/>",
            escape(name.as_str())
        );
        for node in &section.nodes {
            write_node(node, &mut out);
        }
    }

    out.push_str(
        "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
         <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
         w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>",
    );
    out.push_str("</w:body></w:document>");
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Heading { text, level } => {
            let style = format!("Heading{}", clamp_level(*level, HEADING_STYLES));
            write_paragraph(out, &style, text, false);
        }
        Node::Paragraph { text } => write_paragraph(out, "BodyText", text, false),
        Node::Table(table) => write_table(table, out),
    }
}

fn write_paragraph(out: &mut String, style: &str, text: &str, bold: bool) {
    let _ = write!(out, "<w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>", style);
    if !text.is_empty() {
        write_run(out, text, bold);
    }
    out.push_str("</w:p>");
}

/// One run; newlines become `<w:br/>`
fn write_run(out: &mut String, text: &str, bold: bool) {
    out.push_str("<w:r>");
    if bold {
        out.push_str("<w:rPr><w:b/></w:rPr>");
    }
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push_str("<w:br/>");
        }
        let line = xml_safe(line.trim_end_matches('\r'));
        let _ = write!(out, "<w:t xml:space=\"preserve\">{}</w:t>", escape(line.as_str()));
    }
    out.push_str("</w:r>");
}

fn write_table(table: &TableNode, out: &mut String) {
    let columns = table.column_count().max(1);
    let width = TEXT_WIDTH_TWIPS / columns;

    out.push_str("<w:tbl><w:tblPr><w:tblStyle w:val=\"DocforgeTable\"/><w:tblW w:w=\"5000\" w:type=\"pct\"/><w:tblBorders>");
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        let _ = write!(
            out,
            "<w:{edge} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"444444\"/>"
        );
    }
    out.push_str("</w:tblBorders><w:tblLook w:val=\"04A0\" w:firstRow=\"1\"/></w:tblPr><w:tblGrid>");
    for _ in 0..columns {
        let _ = write!(out, "<w:gridCol w:w=\"{}\"/>", width);
    }
    out.push_str("</w:tblGrid>");

    if !table.headers.is_empty() {
        out.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
        for index in 0..columns {
            let cell = table.headers.get(index).map(String::as_str).unwrap_or("");
            write_cell(out, cell, width, true);
        }
        out.push_str("</w:tr>");
    }
    for row in &table.rows {
        out.push_str("<w:tr>");
        for index in 0..columns {
            let cell = row.get(index).map(String::as_str).unwrap_or("");
            write_cell(out, cell, width, false);
        }
        out.push_str("</w:tr>");
    }
    // A table needs at least one row to be valid WordprocessingML
    if table.headers.is_empty() && table.rows.is_empty() {
        out.push_str("<w:tr><w:trPr><w:hidden/></w:trPr>");
        write_cell(out, "", width, false);
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

fn write_cell(out: &mut String, text: &str, width: usize, header: bool) {
    let _ = write!(out, "<w:tc><w:tcPr><w:tcW w:w=\"{}\" w:type=\"dxa\"/>", width);
    if header {
        let _ = write!(
            out,
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
            HEADER_FILL
        );
    }
    out.push_str("</w:tcPr>");
    write_paragraph(out, "TableText", text, header);
    out.push_str("</w:tc>");
}

fn styles_xml() -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    let _ = write!(out, "<w:styles xmlns:w=\"{}\">", W_NS);
    out.push_str(
        "<w:docDefaults><w:rPrDefault><w:rPr>\
         <w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\" w:cs=\"Calibri\"/>\
         <w:sz w:val=\"22\"/></w:rPr></w:rPrDefault>\
         <w:pPrDefault><w:pPr><w:spacing w:after=\"120\"/></w:pPr></w:pPrDefault></w:docDefaults>",
    );
    out.push_str(
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
    );
    for level in 1..=HEADING_STYLES {
        // 16pt for level 1 down to 11pt
        let size = 32u8.saturating_sub((level - 1) * 2).max(22);
        let _ = write!(
            out,
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{level}\">\
             <w:name w:val=\"heading {level}\"/><w:basedOn w:val=\"Normal\"/>\
             <w:next w:val=\"BodyText\"/><w:qFormat/>\
             <w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/>\
             <w:outlineLvl w:val=\"{}\"/></w:pPr>\
             <w:rPr><w:b/><w:sz w:val=\"{size}\"/></w:rPr></w:style>",
            level - 1
        );
    }
    out.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"BodyText\"><w:name w:val=\"Body Text\"/><w:basedOn w:val=\"Normal\"/><w:qFormat/></w:style>",
    );
    out.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"TableText\"><w:name w:val=\"Table Text\"/><w:basedOn w:val=\"Normal\"/><w:pPr><w:spacing w:after=\"0\"/></w:pPr></w:style>",
    );
    out.push_str(
        "<w:style w:type=\"table\" w:styleId=\"DocforgeTable\"><w:name w:val=\"Docforge Table\"/>\
         <w:tblPr><w:tblCellMar><w:left w:w=\"108\" w:type=\"dxa\"/><w:right w:w=\"108\" w:type=\"dxa\"/></w:tblCellMar></w:tblPr></w:style>",
    );
    out.push_str("</w:styles>");
    out
}

/// Drop characters XML 1.0 cannot carry
fn xml_safe(s: &str) -> String {
    s.chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || c >= ' ')
        .collect()
}

fn bookmark_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(24)
        .collect()
}
