//! Submission checks for a data record against its form schema
//!
//! Only fields visible under the record are checked. Hidden fields never
//! block a submission, and `required` is never fail-open.

use docforge_types::{ColumnKind, Field, FieldKind, Schema, TableFieldSpec, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::{check, evaluate};
use crate::errors::{Warning, WarningKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks submission
    Error,
    /// Reported only
    Advisory,
}

/// A problem with one field of the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<ValidationIssue> for Warning {
    fn from(issue: ValidationIssue) -> Self {
        Warning::new(WarningKind::Validation, issue.message).about(issue.field)
    }
}

/// Check every visible field of `data`
pub fn validate(schema: &Schema, data: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for field in schema.fields() {
        if let Some(warning) = check(field.conditional.as_ref()) {
            issues.push(ValidationIssue {
                field: field.id.clone(),
                severity: Severity::Advisory,
                message: warning.message,
            });
        }
        if !evaluate(field.conditional.as_ref(), data) {
            continue;
        }
        check_field(field, data.get(&field.id), &mut issues);
    }
    issues
}

/// `true` when no issue blocks submission
pub fn is_valid(issues: &[ValidationIssue]) -> bool {
    !issues.iter().any(ValidationIssue::is_blocking)
}

fn check_field(field: &Field, value: Option<&Value>, issues: &mut Vec<ValidationIssue>) {
    let label = if field.label.is_empty() {
        field.id.as_str()
    } else {
        field.label.as_str()
    };
    let value = match value {
        Some(value) if !is_blank(value) => value,
        _ => {
            if field.required {
                issues.push(ValidationIssue::error(&field.id, format!("{} is required", label)));
            }
            // Empty tables still have to satisfy minRows
            if let FieldKind::Table(spec) = &field.kind {
                if field.required || spec.min_rows > 0 {
                    check_row_count(&field.id, label, spec, 0, issues);
                }
            }
            return;
        }
    };
    let rules = field.validation.clone().unwrap_or_default();

    match &field.kind {
        FieldKind::Number => match number(value) {
            Some(n) => check_range(&field.id, label, n, &rules, issues),
            None => issues.push(ValidationIssue::error(
                &field.id,
                format!("{} must be a number", label),
            )),
        },
        FieldKind::Text | FieldKind::Textarea | FieldKind::Date => {
            if let Some(text) = value.as_str() {
                check_length(&field.id, label, text, &rules, issues);
            }
        }
        FieldKind::Select(spec) => {
            let chosen = scalar_text(value);
            if !spec.options.is_empty() && !spec.options.iter().any(|o| *o == chosen) {
                issues.push(ValidationIssue::error(
                    &field.id,
                    format!("{} must be one of: {}", label, spec.options.join(", ")),
                ));
            }
        }
        FieldKind::Table(spec) => match value.as_array() {
            Some(rows) => {
                check_row_count(&field.id, label, spec, rows.len(), issues);
                check_rows(&field.id, spec, rows, issues);
            }
            None => issues.push(ValidationIssue::error(
                &field.id,
                format!("{} must be a list of rows", label),
            )),
        },
    }
}

fn check_range(id: &str, label: &str, n: f64, rules: &Validation, issues: &mut Vec<ValidationIssue>) {
    if let Some(min) = rules.min {
        if n < min {
            issues.push(ValidationIssue::error(id, format!("{} must be at least {}", label, min)));
        }
    }
    if let Some(max) = rules.max {
        if n > max {
            issues.push(ValidationIssue::error(id, format!("{} must be at most {}", label, max)));
        }
    }
}

fn check_length(
    id: &str,
    label: &str,
    text: &str,
    rules: &Validation,
    issues: &mut Vec<ValidationIssue>,
) {
    let len = text.chars().count();
    if let Some(min) = rules.min_length {
        if len < min {
            issues.push(ValidationIssue::error(
                id,
                format!("{} must be at least {} characters", label, min),
            ));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            issues.push(ValidationIssue::error(
                id,
                format!("{} must be at most {} characters", label, max),
            ));
        }
    }
}

fn check_row_count(
    id: &str,
    label: &str,
    spec: &TableFieldSpec,
    rows: usize,
    issues: &mut Vec<ValidationIssue>,
) {
    let bounds = spec.bounds();
    if bounds.contains(rows) {
        return;
    }
    let message = match bounds.max_rows {
        Some(max) => format!(
            "{} needs between {} and {} rows, got {}",
            label, bounds.min_rows, max, rows
        ),
        None => format!("{} needs at least {} rows, got {}", label, bounds.min_rows, rows),
    };
    issues.push(ValidationIssue::error(id, message));
}

fn check_rows(id: &str, spec: &TableFieldSpec, rows: &[Value], issues: &mut Vec<ValidationIssue>) {
    for (index, row) in rows.iter().enumerate() {
        for column in &spec.columns {
            let Some(cell) = row.get(&column.key).filter(|v| !is_blank(v)) else {
                continue;
            };
            match column.kind {
                ColumnKind::Select => {
                    let Some(options) = column.options.as_ref().filter(|o| !o.is_empty()) else {
                        continue;
                    };
                    let chosen = scalar_text(cell);
                    if !options.iter().any(|o| *o == chosen) {
                        issues.push(ValidationIssue::error(
                            id,
                            format!(
                                "Row {} column '{}' must be one of: {}",
                                index + 1,
                                column.key,
                                options.join(", ")
                            ),
                        ));
                    }
                }
                ColumnKind::Number => {
                    if number(cell).is_none() {
                        issues.push(ValidationIssue::error(
                            id,
                            format!("Row {} column '{}' must be a number", index + 1, column.key),
                        ));
                    }
                }
                ColumnKind::Text | ColumnKind::Date => {}
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
