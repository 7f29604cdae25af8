//! Structure skeleton: the document layout independent of user data

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::Condition;

/// Top-level document skeleton
///
/// `sections` is deliberately not defaulted: a skeleton without sections is
/// malformed input, not an empty document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub sections: Vec<StructureSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<Heading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

/// Header and footer sections belong to page layout, not the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Footer,
    #[default]
    #[serde(other)]
    Body,
}

impl SectionKind {
    pub fn is_page_chrome(&self) -> bool {
        matches!(self, SectionKind::Header | SectionKind::Footer)
    }
}

/// Section heading, either `"text"` or `{ "text": ..., "level": n }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Heading {
    Plain(String),
    Styled {
        #[serde(default)]
        text: String,
        /// Any non-negative integer; renderers clamp it to their range
        #[serde(default = "default_level")]
        level: u64,
    },
}

fn default_level() -> u64 {
    1
}

impl Heading {
    pub fn text(&self) -> &str {
        match self {
            Heading::Plain(text) => text,
            Heading::Styled { text, .. } => text,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Heading::Plain(_) => 1,
            Heading::Styled { level, .. } => u8::try_from(*level).unwrap_or(u8::MAX).max(1),
        }
    }
}

/// A slot in a content list
///
/// Anything that does not parse as a known [`ContentItem`] is kept raw so
/// assembly can skip it with a warning instead of rejecting the skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    Item(ContentItem),
    Unrecognized(Value),
}

impl ContentEntry {
    /// The `type` tag of an unrecognized entry, for diagnostics
    pub fn raw_kind(&self) -> Option<&str> {
        match self {
            ContentEntry::Item(_) => None,
            ContentEntry::Unrecognized(raw) => Some(
                raw.get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("<untyped>"),
            ),
        }
    }
}

impl From<ContentItem> for ContentEntry {
    fn from(item: ContentItem) -> Self {
        ContentEntry::Item(item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Paragraph(ParagraphItem),
    Table(TableDirective),
    Conditional(ConditionalItem),
}

impl ContentItem {
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            ContentItem::Paragraph(p) => p.condition.as_ref(),
            ContentItem::Table(t) => t.condition.as_ref(),
            ContentItem::Conditional(c) => c.condition.as_ref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentItem::Paragraph(_) => "paragraph",
            ContentItem::Table(_) => "table",
            ContentItem::Conditional(_) => "conditional",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphItem {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// Table directive; the row source is the first of `loopSource`,
/// `boilerplateSource`, `rows`, `emptyRows` that is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDirective {
    #[serde(default)]
    pub headers: Vec<String>,
    /// Path to an array in the data record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_source: Option<String>,
    /// Cell templates rendered against each loop element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_template: Vec<Value>,
    /// Id of a table in the content library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boilerplate_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_structure() {
        let structure: Structure = serde_json::from_value(json!({
            "sections": [
                {"type": "header", "content": [{"type": "paragraph", "text": "ACME"}]},
                {
                    "id": "body",
                    "heading": {"text": "Report for {{project}}", "level": 2},
                    "content": [
                        {"type": "paragraph", "text": "{{boilerplate.intro}}"},
                        {"type": "table", "headers": ["Name", "Qty"],
                         "loopSource": "items", "rowTemplate": ["{{name}}", "{{qty}}"]},
                        {"type": "conditional",
                         "condition": {"field": "includeSafety", "operator": "equals", "value": true},
                         "content": [{"type": "paragraph", "text": "Safety first."}]},
                        {"type": "image", "src": "logo.png"}
                    ]
                }
            ]
        }))
        .unwrap();

        assert!(structure.sections[0].kind.is_page_chrome());
        let body = &structure.sections[1];
        assert_eq!(body.kind, SectionKind::Body);
        let heading = body.heading.as_ref().unwrap();
        assert_eq!(heading.text(), "Report for {{project}}");
        assert_eq!(heading.level(), 2);

        let kinds: Vec<_> = body
            .content
            .iter()
            .map(|e| match e {
                ContentEntry::Item(item) => item.kind(),
                ContentEntry::Unrecognized(_) => "unrecognized",
            })
            .collect();
        assert_eq!(kinds, vec!["paragraph", "table", "conditional", "unrecognized"]);
        assert_eq!(body.content[3].raw_kind(), Some("image"));

        let ContentEntry::Item(ContentItem::Table(table)) = &body.content[1] else {
            panic!("expected table");
        };
        assert_eq!(table.loop_source.as_deref(), Some("items"));
        assert_eq!(table.row_template.len(), 2);
    }

    #[test]
    fn test_plain_heading_and_unknown_section_kind() {
        let section: StructureSection = serde_json::from_value(json!({
            "type": "appendix",
            "heading": "Terms"
        }))
        .unwrap();
        assert_eq!(section.kind, SectionKind::Body);
        assert_eq!(section.heading.unwrap().level(), 1);
    }

    #[test]
    fn test_out_of_range_heading_level_saturates() {
        let heading: Heading =
            serde_json::from_value(json!({"text": "Annex", "level": 300})).unwrap();
        assert_eq!(heading.level(), u8::MAX);

        let heading: Heading = serde_json::from_value(json!({"text": "Annex", "level": 0})).unwrap();
        assert_eq!(heading.level(), 1);
    }

    #[test]
    fn test_missing_sections_is_an_error() {
        let parsed: Result<Structure, _> = serde_json::from_value(json!({"title": "x"}));
        assert!(parsed.is_err());
    }
}
