//! Form schema: sections of typed fields used to collect the data record

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Form definition produced by template analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

impl Schema {
    /// All fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Look up a field by id
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A single form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Visibility clause; the field is shown when it holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Field type, tagged by the `type` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    Select(SelectSpec),
    Table(TableFieldSpec),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Select(_) => "select",
            FieldKind::Table(_) => "table",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectSpec {
    #[serde(default)]
    pub options: Vec<String>,
}

/// Repeating-row field definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldSpec {
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    #[serde(default)]
    pub min_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_rows: Option<usize>,
}

impl TableFieldSpec {
    pub fn bounds(&self) -> TableBounds {
        TableBounds {
            min_rows: self.min_rows,
            max_rows: self.max_rows,
            default_rows: self.default_rows.unwrap_or(self.min_rows),
        }
    }
}

/// Row-count limits of a table field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBounds {
    pub min_rows: usize,
    /// `None` means unbounded
    pub max_rows: Option<usize>,
    pub default_rows: usize,
}

impl TableBounds {
    pub fn contains(&self, rows: usize) -> bool {
        rows >= self.min_rows && self.max_rows.map_or(true, |max| rows <= max)
    }

    pub fn clamp(&self, rows: usize) -> usize {
        let rows = rows.max(self.min_rows);
        match self.max_rows {
            Some(max) => rows.min(max.max(self.min_rows)),
            None => rows,
        }
    }

    /// Initial row count for a fresh form
    pub fn initial_rows(&self) -> usize {
        self.clamp(self.default_rows)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    Date,
    Select,
    #[default]
    #[serde(other)]
    Text,
}

/// Optional value constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}
