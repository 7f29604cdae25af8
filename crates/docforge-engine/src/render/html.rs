//! HTML preview renderer

use std::fmt::Write;

use docforge_types::{DocumentTree, Node, TableNode};

use super::clamp_level;

const PREVIEW_CSS: &str = "body{font-family:Calibri,Arial,sans-serif;max-width:50em;margin:2em auto;line-height:1.4}\
table{border-collapse:collapse;margin:1em 0;width:100%}\
th,td{border:1px solid #444;padding:4px 8px;text-align:left;vertical-align:top}\
th{background:#d9d9d9;font-weight:bold}";

/// Render the tree as an HTML fragment
///
/// One `<section class="doc-section">` per tree section, in order.
pub fn render_html(tree: &DocumentTree) -> String {
    let mut out = String::new();
    for section in &tree.sections {
        match &section.id {
            Some(id) => {
                let _ = writeln!(
                    out,
                    "<section class=\"doc-section\" data-section=\"{}\">",
                    escape_html(id)
                );
            }
            None => out.push_str("<section class=\"doc-section\">\n"),
        }
        for node in &section.nodes {
            write_node(node, &mut out);
        }
        out.push_str("</section>\n");
    }
    out
}

/// Render the tree as a standalone HTML5 page
pub fn render_html_page(tree: &DocumentTree, title: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    let _ = writeln!(out, "<style>{}</style>", PREVIEW_CSS);
    out.push_str("</head>\n<body>\n");
    out.push_str(&render_html(tree));
    out.push_str("</body>\n</html>\n");
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Heading { text, level } => {
            let level = clamp_level(*level, 6);
            let _ = writeln!(out, "<h{level}>{}</h{level}>", escape_text(text));
        }
        Node::Paragraph { text } => {
            let _ = writeln!(out, "<p>{}</p>", escape_text(text));
        }
        Node::Table(table) => write_table(table, out),
    }
}

fn write_table(table: &TableNode, out: &mut String) {
    let columns = table.column_count();
    out.push_str("<table>\n");
    if !table.headers.is_empty() {
        out.push_str("<thead>\n<tr>");
        for index in 0..columns {
            let cell = table.headers.get(index).map(String::as_str).unwrap_or("");
            let _ = write!(out, "<th>{}</th>", escape_text(cell));
        }
        out.push_str("</tr>\n</thead>\n");
    }
    out.push_str("<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for index in 0..columns {
            let cell = row.get(index).map(String::as_str).unwrap_or("");
            let _ = write!(out, "<td>{}</td>", escape_text(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

/// Escape text content and turn newlines into `<br>`
fn escape_text(s: &str) -> String {
    escape_html(s).replace('\n', "<br>")
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_types::SectionNode;
    use pretty_assertions::assert_eq;

    fn sample() -> DocumentTree {
        DocumentTree {
            sections: vec![SectionNode {
                id: Some("intro".to_string()),
                nodes: vec![
                    Node::Heading {
                        text: "Report for <Alpha>".to_string(),
                        level: 2,
                    },
                    Node::Paragraph {
                        text: "Line one\nLine \"two\" & more".to_string(),
                    },
                    Node::Table(TableNode {
                        headers: vec!["Name".to_string(), "Qty".to_string()],
                        rows: vec![vec!["Bolt".to_string(), "4".to_string()]],
                    }),
                ],
            }],
        }
    }

    #[test]
    fn test_render_html_fragment() {
        let html = render_html(&sample());
        assert_eq!(
            html,
            "<section class=\"doc-section\" data-section=\"intro\">\n\
             <h2>Report for &lt;Alpha&gt;</h2>\n\
             <p>Line one<br>Line &quot;two&quot; &amp; more</p>\n\
             <table>\n<thead>\n<tr><th>Name</th><th>Qty</th></tr>\n</thead>\n\
             <tbody>\n<tr><td>Bolt</td><td>4</td></tr>\n</tbody>\n</table>\n\
             </section>\n"
        );
    }

    #[test]
    fn test_heading_level_clamped() {
        let tree = DocumentTree {
            sections: vec![SectionNode {
                id: None,
                nodes: vec![Node::Heading {
                    text: "Deep".to_string(),
                    level: 9,
                }],
            }],
        };
        assert!(render_html(&tree).contains("<h6>Deep</h6>"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let tree = DocumentTree {
            sections: vec![SectionNode {
                id: None,
                nodes: vec![Node::Table(TableNode {
                    headers: vec!["A".to_string(), "B".to_string()],
                    rows: vec![vec!["1".to_string()]],
                })],
            }],
        };
        assert!(render_html(&tree).contains("<tr><td>1</td><td></td></tr>"));
    }

    #[test]
    fn test_page_wraps_fragment() {
        let page = render_html_page(&sample(), "Q3 <Report>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Q3 &lt;Report&gt;</title>"));
        assert!(page.contains("<section class=\"doc-section\""));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
