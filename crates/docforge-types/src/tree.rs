//! Abstract document tree
//!
//! The renderer-agnostic result of assembly. Both the DOCX and HTML
//! renderers consume this and nothing else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    pub sections: Vec<SectionNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Heading { text: String, level: u8 },
    Paragraph { text: String },
    Table(TableNode),
}

/// A fully expanded table; `rows` never includes the header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableNode {
    /// Number of columns, taking the widest of headers and rows
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Node counts, used to compare render targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub sections: usize,
    pub headings: usize,
    pub paragraphs: usize,
    pub tables: usize,
    pub rows: usize,
}

impl DocumentTree {
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            sections: self.sections.len(),
            ..TreeStats::default()
        };
        for node in self.sections.iter().flat_map(|s| s.nodes.iter()) {
            match node {
                Node::Heading { .. } => stats.headings += 1,
                Node::Paragraph { .. } => stats.paragraphs += 1,
                Node::Table(table) => {
                    stats.tables += 1;
                    stats.rows += table.rows.len();
                }
            }
        }
        stats
    }
}
