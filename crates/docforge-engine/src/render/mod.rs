//! Output renderers
//!
//! Both renderers are pure functions of a [`DocumentTree`](docforge_types::DocumentTree).
//! Neither re-evaluates conditions nor re-resolves placeholders, so the DOCX
//! and the HTML preview always carry the same sections, headings, paragraphs
//! and tables.

pub mod docx;
pub mod html;

pub use docx::render_docx;
pub use html::{render_html, render_html_page};

use serde::{Deserialize, Serialize};

/// Output format for generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Docx,
    Html,
}

impl OutputFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Html => "text/html; charset=utf-8",
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Docx => write!(f, "docx"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" | "word" => Ok(OutputFormat::Docx),
            "html" | "htm" => Ok(OutputFormat::Html),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Clamp a tree heading level into `1..=max`
pub(crate) fn clamp_level(level: u8, max: u8) -> u8 {
    level.clamp(1, max)
}
