//! Document assembly
//!
//! Walks the structure skeleton against a data record and the content
//! library, producing a [`DocumentTree`]. Items whose condition fails are
//! omitted entirely. Anomalies (unresolved placeholders, unknown operators,
//! unrecognized content) never abort assembly; they are collected as
//! [`Warning`]s next to the tree.

use docforge_types::{
    Block, Condition, ContentEntry, ContentItem, ContentLibrary, DocumentTree, Node, SectionNode,
    Structure, StructureSection, TableNode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::condition::{check, evaluate};
use crate::errors::{EngineError, Warning, WarningKind};
use crate::table::{expand_with_warnings, unresolved_warning};
use crate::template::render_collect;

/// Result of assembling one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub tree: DocumentTree,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// Parse a raw skeleton, rejecting one without a non-empty `sections` array
pub fn parse_structure(raw: Value) -> Result<Structure, EngineError> {
    match raw.get("sections") {
        Some(Value::Array(sections)) if !sections.is_empty() => {}
        Some(Value::Array(_)) | None | Some(Value::Null) => {
            return Err(EngineError::MissingSections)
        }
        Some(_) => {
            return Err(EngineError::InvalidInput(
                "structure.sections must be an array".to_string(),
            ))
        }
    }
    serde_json::from_value(raw)
        .map_err(|e| EngineError::InvalidInput(format!("structure: {}", e)))
}

/// Assemble a document tree
pub fn assemble(
    structure: &Structure,
    content: &ContentLibrary,
    data: &Value,
) -> Result<Assembly, EngineError> {
    if structure.sections.is_empty() {
        return Err(EngineError::MissingSections);
    }

    let mut warnings = Vec::new();
    let boilerplate = boilerplate_view(content, data, &mut warnings);

    let mut assembler = Assembler {
        data,
        boilerplate: &boilerplate,
        warnings,
    };
    let sections = structure
        .sections
        .iter()
        .enumerate()
        .filter_map(|(index, section)| assembler.section(index, section))
        .collect();

    let warnings = assembler.warnings;
    for warning in &warnings {
        warn!(kind = ?warning.kind, "{}", warning);
    }

    Ok(Assembly {
        tree: DocumentTree { sections },
        warnings,
    })
}

/// Resolve the content library into the object `boilerplate.*` paths see
///
/// - `<blockId>`: text of the first matching variant (name order), else the default
/// - `conditionalSections.<id>`: section text when its trigger holds, else `""`
/// - `tables.<id>`: the library table as declared
pub fn boilerplate_view(
    content: &ContentLibrary,
    data: &Value,
    warnings: &mut Vec<Warning>,
) -> Value {
    let mut view = Map::new();

    for (id, block) in &content.blocks {
        let text = select_variant(id, block, data, warnings);
        view.insert(id.clone(), Value::String(text.to_string()));
    }

    let mut sections = Map::new();
    for (id, section) in &content.conditional_sections {
        note_unknown_operator(
            section.condition.as_ref(),
            &format!("content.conditionalSections.{}", id),
            warnings,
        );
        let text = if evaluate(section.condition.as_ref(), data) {
            section.text.clone()
        } else {
            String::new()
        };
        sections.insert(id.clone(), Value::String(text));
    }
    view.insert("conditionalSections".to_string(), Value::Object(sections));

    let tables = content
        .tables
        .iter()
        .filter_map(|(id, table)| serde_json::to_value(table).ok().map(|v| (id.clone(), v)))
        .collect();
    view.insert("tables".to_string(), Value::Object(tables));

    Value::Object(view)
}

fn select_variant<'b>(
    id: &str,
    block: &'b Block,
    data: &Value,
    warnings: &mut Vec<Warning>,
) -> &'b str {
    for (name, variant) in &block.variants {
        let Some(condition) = variant.condition.as_ref().filter(|c| c.has_target()) else {
            continue;
        };
        note_unknown_operator(
            Some(condition),
            &format!("content.blocks.{}.variants.{}", id, name),
            warnings,
        );
        if evaluate(Some(condition), data) {
            debug!(block = id, variant = %name, "Selected block variant");
            return &variant.text;
        }
    }
    &block.default
}

fn note_unknown_operator(condition: Option<&Condition>, location: &str, warnings: &mut Vec<Warning>) {
    if let Some(warning) = check(condition) {
        warnings.push(warning.at(location));
    }
}

struct Assembler<'a> {
    data: &'a Value,
    boilerplate: &'a Value,
    warnings: Vec<Warning>,
}

impl Assembler<'_> {
    fn section(&mut self, index: usize, section: &StructureSection) -> Option<SectionNode> {
        let location = format!("sections[{}]", index);

        if section.kind.is_page_chrome() {
            debug!(section = index, kind = ?section.kind, "Skipping page layout section");
            return None;
        }
        if !self.condition_holds(section.condition.as_ref(), &location) {
            debug!(section = index, "Section condition not satisfied");
            return None;
        }

        let mut nodes = Vec::new();
        if let Some(heading) = &section.heading {
            let text = self.text(heading.text(), &format!("{}.heading", location));
            nodes.push(Node::Heading {
                text,
                level: heading.level(),
            });
        }
        self.items(&section.content, &format!("{}.content", location), &mut nodes);

        Some(SectionNode {
            id: section.id.clone(),
            nodes,
        })
    }

    fn items(&mut self, entries: &[ContentEntry], location: &str, nodes: &mut Vec<Node>) {
        for (index, entry) in entries.iter().enumerate() {
            let location = format!("{}[{}]", location, index);
            let item = match entry {
                ContentEntry::Item(item) => item,
                ContentEntry::Unrecognized(_) => {
                    let kind = entry.raw_kind().unwrap_or("<untyped>");
                    self.warnings.push(
                        Warning::new(
                            WarningKind::UnrecognizedContent,
                            format!("Skipped unrecognized content item of type '{}'", kind),
                        )
                        .at(location)
                        .about(kind),
                    );
                    continue;
                }
            };

            if !self.condition_holds(item.condition(), &location) {
                debug!(location = %location, kind = item.kind(), "Omitting item");
                continue;
            }

            match item {
                ContentItem::Paragraph(paragraph) => {
                    let text = self.text(&paragraph.text, &location);
                    nodes.push(Node::Paragraph { text });
                }
                ContentItem::Table(directive) => {
                    let start = self.warnings.len();
                    let table = expand_with_warnings(
                        directive,
                        self.data,
                        self.boilerplate,
                        &mut self.warnings,
                    );
                    for warning in &mut self.warnings[start..] {
                        if warning.location.is_none() {
                            warning.location = Some(location.clone());
                        }
                    }
                    nodes.push(Node::Table(TableNode {
                        headers: table.headers,
                        rows: table.rows,
                    }));
                }
                ContentItem::Conditional(conditional) => {
                    self.items(&conditional.content, &format!("{}.content", location), nodes);
                }
            }
        }
    }

    fn condition_holds(&mut self, condition: Option<&Condition>, location: &str) -> bool {
        note_unknown_operator(condition, location, &mut self.warnings);
        evaluate(condition, self.data)
    }

    fn text(&mut self, template: &str, location: &str) -> String {
        let mut unresolved = Vec::new();
        let text = render_collect(template, self.data, self.boilerplate, &mut unresolved);
        self.warnings.extend(
            unresolved
                .into_iter()
                .map(|path| unresolved_warning(path).at(location)),
        );
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn structure(value: Value) -> Structure {
        parse_structure(value).unwrap()
    }

    fn library(value: Value) -> ContentLibrary {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_end_to_end_report() {
        let s = structure(json!({
            "sections": [{
                "heading": {"text": "Report for {{project}}", "level": 1},
                "content": [{"type": "paragraph", "text": "{{boilerplate.intro}}"}]
            }]
        }));
        let c = library(json!({"blocks": {"intro": {"default": "Standard intro text."}}}));
        let assembly = assemble(&s, &c, &json!({"project": "Alpha"})).unwrap();

        assert_eq!(
            assembly.tree,
            DocumentTree {
                sections: vec![SectionNode {
                    id: None,
                    nodes: vec![
                        Node::Heading {
                            text: "Report for Alpha".to_string(),
                            level: 1
                        },
                        Node::Paragraph {
                            text: "Standard intro text.".to_string()
                        },
                    ],
                }]
            }
        );
        assert!(assembly.warnings.is_empty());
    }

    #[test]
    fn test_failed_condition_omits_item() {
        let s = structure(json!({
            "sections": [{
                "content": [
                    {"type": "paragraph", "text": "Always"},
                    {"type": "paragraph", "text": "Safety",
                     "condition": {"field": "includeSafety", "operator": "equals", "value": true}}
                ]
            }]
        }));
        let assembly =
            assemble(&s, &ContentLibrary::default(), &json!({"includeSafety": false})).unwrap();
        assert_eq!(
            assembly.tree.sections[0].nodes,
            vec![Node::Paragraph {
                text: "Always".to_string()
            }]
        );
    }

    #[test]
    fn test_conditional_block_recurses_only_when_true() {
        let s = structure(json!({
            "sections": [{
                "content": [{
                    "type": "conditional",
                    "condition": {"field": "tier", "operator": "equals", "value": "gold"},
                    "content": [
                        {"type": "paragraph", "text": "Gold terms"},
                        {"type": "conditional",
                         "condition": {"field": "budget", "operator": "greater_than", "value": 1000},
                         "content": [{"type": "paragraph", "text": "Large budget"}]}
                    ]
                }]
            }]
        }));
        let lib = ContentLibrary::default();

        let gold_big = assemble(&s, &lib, &json!({"tier": "gold", "budget": 5000})).unwrap();
        assert_eq!(gold_big.tree.stats().paragraphs, 2);

        let gold_small = assemble(&s, &lib, &json!({"tier": "gold", "budget": 10})).unwrap();
        assert_eq!(gold_small.tree.stats().paragraphs, 1);

        let silver = assemble(&s, &lib, &json!({"tier": "silver", "budget": 5000})).unwrap();
        assert_eq!(silver.tree.stats().paragraphs, 0);
    }

    #[test]
    fn test_header_footer_sections_are_skipped() {
        let s = structure(json!({
            "sections": [
                {"type": "header", "content": [{"type": "paragraph", "text": "ACME"}]},
                {"id": "body", "content": [{"type": "paragraph", "text": "Body"}]},
                {"type": "footer", "content": [{"type": "paragraph", "text": "Page"}]}
            ]
        }));
        let assembly = assemble(&s, &ContentLibrary::default(), &json!({})).unwrap();
        assert_eq!(assembly.tree.sections.len(), 1);
        assert_eq!(assembly.tree.sections[0].id.as_deref(), Some("body"));
    }

    #[test]
    fn test_oversized_heading_level_is_kept_and_clamped_on_render() {
        let s = structure(json!({
            "sections": [{"heading": {"text": "Annex", "level": 300}, "content": []}]
        }));
        let assembly = assemble(&s, &ContentLibrary::default(), &json!({})).unwrap();
        assert_eq!(
            assembly.tree.sections[0].nodes,
            vec![Node::Heading {
                text: "Annex".to_string(),
                level: u8::MAX
            }]
        );
        assert!(crate::render::render_html(&assembly.tree).contains("<h6>Annex</h6>"));
    }

    #[test]
    fn test_section_condition() {
        let s = structure(json!({
            "sections": [
                {"content": [{"type": "paragraph", "text": "A"}]},
                {"condition": {"field": "appendix", "operator": "equals", "value": true},
                 "content": [{"type": "paragraph", "text": "B"}]}
            ]
        }));
        let lib = ContentLibrary::default();
        assert_eq!(assemble(&s, &lib, &json!({})).unwrap().tree.sections.len(), 1);
        assert_eq!(
            assemble(&s, &lib, &json!({"appendix": true}))
                .unwrap()
                .tree
                .sections
                .len(),
            2
        );
    }

    #[test]
    fn test_unknown_item_is_skipped_with_warning() {
        let s = structure(json!({
            "sections": [{
                "content": [
                    {"type": "image", "src": "logo.png"},
                    {"type": "paragraph", "text": "After"}
                ]
            }]
        }));
        let assembly = assemble(&s, &ContentLibrary::default(), &json!({})).unwrap();
        assert_eq!(assembly.tree.stats().paragraphs, 1);
        assert_eq!(assembly.warnings.len(), 1);
        let warning = &assembly.warnings[0];
        assert_eq!(warning.kind, WarningKind::UnrecognizedContent);
        assert_eq!(warning.location.as_deref(), Some("sections[0].content[0]"));
        assert_eq!(warning.subject.as_deref(), Some("image"));
    }

    #[test]
    fn test_unresolved_placeholder_warns_and_is_preserved() {
        let s = structure(json!({
            "sections": [{"content": [{"type": "paragraph", "text": "Hello {{missing.path}}"}]}]
        }));
        let assembly = assemble(&s, &ContentLibrary::default(), &json!({})).unwrap();
        assert_eq!(
            assembly.tree.sections[0].nodes[0],
            Node::Paragraph {
                text: "Hello {{missing.path}}".to_string()
            }
        );
        assert_eq!(assembly.warnings[0].kind, WarningKind::UnresolvedPlaceholder);
        assert_eq!(
            assembly.warnings[0].location.as_deref(),
            Some("sections[0].content[0]")
        );
    }

    #[test]
    fn test_unknown_operator_fails_open_with_warning() {
        let s = structure(json!({
            "sections": [{
                "content": [{"type": "paragraph", "text": "Shown",
                             "condition": {"field": "x", "operator": "equal", "value": 1}}]
            }]
        }));
        let assembly = assemble(&s, &ContentLibrary::default(), &json!({"x": 2})).unwrap();
        assert_eq!(assembly.tree.stats().paragraphs, 1);
        assert_eq!(assembly.warnings[0].kind, WarningKind::UnknownOperator);
    }

    #[test]
    fn test_variant_selection() {
        let lib = library(json!({
            "blocks": {
                "intro": {
                    "default": "Standard.",
                    "variants": {
                        "a_express": {
                            "condition": {"field": "tier", "operator": "equals", "value": "express"},
                            "text": "Express."
                        },
                        "b_always": {"text": "Never auto-selected."}
                    }
                }
            }
        }));
        let s = structure(json!({
            "sections": [{"content": [{"type": "paragraph", "text": "{{boilerplate.intro}}"}]}]
        }));
        let express = assemble(&s, &lib, &json!({"tier": "express"})).unwrap();
        let standard = assemble(&s, &lib, &json!({"tier": "standard"})).unwrap();
        assert_eq!(
            express.tree.sections[0].nodes[0],
            Node::Paragraph {
                text: "Express.".to_string()
            }
        );
        assert_eq!(
            standard.tree.sections[0].nodes[0],
            Node::Paragraph {
                text: "Standard.".to_string()
            }
        );
    }

    #[test]
    fn test_conditional_sections_in_boilerplate() {
        let lib = library(json!({
            "conditionalSections": {
                "safety": {
                    "condition": {"field": "includeSafety", "operator": "equals", "value": true},
                    "text": "Wear protective equipment."
                }
            }
        }));
        let mut warnings = Vec::new();
        let on = boilerplate_view(&lib, &json!({"includeSafety": true}), &mut warnings);
        let off = boilerplate_view(&lib, &json!({"includeSafety": false}), &mut warnings);
        assert_eq!(
            on["conditionalSections"]["safety"],
            json!("Wear protective equipment.")
        );
        assert_eq!(off["conditionalSections"]["safety"], json!(""));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_library_table_item() {
        let lib = library(json!({
            "tables": {"fees": {"headers": ["Item", "Fee"], "defaultRows": [["Setup", 100]]}}
        }));
        let s = structure(json!({
            "sections": [{"content": [{"type": "table", "boilerplateSource": "fees"}]}]
        }));
        let assembly = assemble(&s, &lib, &json!({})).unwrap();
        assert_eq!(
            assembly.tree.sections[0].nodes[0],
            Node::Table(TableNode {
                headers: vec!["Item".to_string(), "Fee".to_string()],
                rows: vec![vec!["Setup".to_string(), "100".to_string()]],
            })
        );
    }

    #[test]
    fn test_table_warnings_get_item_location() {
        let s = structure(json!({
            "sections": [{"content": [
                {"type": "paragraph", "text": "x"},
                {"type": "table", "loopSource": "rows", "rowTemplate": ["{{a}}"]}
            ]}]
        }));
        let assembly = assemble(&s, &ContentLibrary::default(), &json!({})).unwrap();
        assert_eq!(assembly.warnings[0].kind, WarningKind::MissingLoopSource);
        assert_eq!(
            assembly.warnings[0].location.as_deref(),
            Some("sections[0].content[1]")
        );
    }

    #[test]
    fn test_missing_sections_is_hard_failure() {
        assert!(matches!(
            parse_structure(json!({})),
            Err(EngineError::MissingSections)
        ));
        assert!(matches!(
            parse_structure(json!({"sections": []})),
            Err(EngineError::MissingSections)
        ));
        assert!(matches!(
            parse_structure(json!({"sections": "nope"})),
            Err(EngineError::InvalidInput(_))
        ));
        let empty = Structure { sections: vec![] };
        assert!(matches!(
            assemble(&empty, &ContentLibrary::default(), &json!({})),
            Err(EngineError::MissingSections)
        ));
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let s = structure(json!({
            "sections": [{
                "heading": "Items for {{client}}",
                "content": [
                    {"type": "table", "headers": ["Name"], "loopSource": "items",
                     "rowTemplate": ["{{name}}"]},
                    {"type": "paragraph", "text": "{{unknown}}"}
                ]
            }]
        }));
        let data = json!({"client": "ACME", "items": [{"name": "a"}, {"name": "b"}]});
        let lib = ContentLibrary::default();
        let first = assemble(&s, &lib, &data).unwrap();
        let second = assemble(&s, &lib, &data).unwrap();
        assert_eq!(first, second);
    }
}
