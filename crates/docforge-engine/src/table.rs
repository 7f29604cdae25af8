//! Table expansion
//!
//! Turns a [`TableDirective`] into concrete rows. The row source is chosen by
//! the first directive key present: loop, library table, inline rows, empty
//! rows. Header cells are rendered against the top-level record and are
//! never part of the loop.

use docforge_types::{LibraryTable, TableDirective};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{Warning, WarningKind};
use crate::resolver::resolve;
use crate::template::{render_collect, render_value, stringify};

/// Column count used for empty-row tables that declare no headers
pub const DEFAULT_EMPTY_COLUMNS: usize = 3;

/// Most rows a single table may expand to
pub const MAX_TABLE_ROWS: usize = 10_000;

/// Most cells a single expanded row may carry
pub const MAX_TABLE_COLUMNS: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Which row source a directive resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    Loop,
    Library,
    Inline,
    Empty,
    None,
}

impl RowSource {
    pub fn of(directive: &TableDirective) -> Self {
        if directive.loop_source.is_some() {
            RowSource::Loop
        } else if directive.boilerplate_source.is_some() {
            RowSource::Library
        } else if directive.rows.is_some() {
            RowSource::Inline
        } else if directive.empty_rows.is_some() {
            RowSource::Empty
        } else {
            RowSource::None
        }
    }
}

/// Expand a table directive, discarding warnings
pub fn expand(directive: &TableDirective, data: &Value, boilerplate: &Value) -> ExpandedTable {
    let mut warnings = Vec::new();
    expand_with_warnings(directive, data, boilerplate, &mut warnings)
}

/// Expand a table directive, appending advisory warnings
pub fn expand_with_warnings(
    directive: &TableDirective,
    data: &Value,
    boilerplate: &Value,
    warnings: &mut Vec<Warning>,
) -> ExpandedTable {
    let mut unresolved = Vec::new();
    let mut headers: Vec<String> = directive
        .headers
        .iter()
        .map(|h| render_collect(h, data, boilerplate, &mut unresolved))
        .collect();

    let source = RowSource::of(directive);
    let rows = match source {
        RowSource::Loop => {
            let path = directive.loop_source.as_deref().unwrap_or_default();
            loop_rows(path, &directive.row_template, data, boilerplate, &mut unresolved, warnings)
        }
        RowSource::Library => {
            let reference = directive.boilerplate_source.as_deref().unwrap_or_default();
            match library_table(reference, boilerplate) {
                Some(table) => {
                    if headers.is_empty() {
                        headers = table.headers.clone();
                    }
                    let count = capped(
                        table.default_rows.len(),
                        MAX_TABLE_ROWS,
                        "rows",
                        reference,
                        warnings,
                    );
                    table.default_rows[..count]
                        .iter()
                        .map(|row| row.iter().map(stringify).collect())
                        .collect()
                }
                None => {
                    warnings.push(
                        Warning::new(
                            WarningKind::MissingLibraryTable,
                            format!("Content library has no table '{}'", reference),
                        )
                        .about(reference),
                    );
                    Vec::new()
                }
            }
        }
        RowSource::Inline => {
            let rows = directive.rows.as_deref().unwrap_or_default();
            let count = capped(rows.len(), MAX_TABLE_ROWS, "rows", "inline rows", warnings);
            rows[..count]
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| {
                            stringify(&render_value(cell, data, boilerplate, &mut unresolved))
                        })
                        .collect()
                })
                .collect()
        }
        RowSource::Empty => {
            let requested = directive.empty_rows.unwrap_or(0);
            let count = capped(requested, MAX_TABLE_ROWS, "rows", "emptyRows", warnings);
            let columns = if headers.is_empty() {
                DEFAULT_EMPTY_COLUMNS
            } else {
                capped(headers.len(), MAX_TABLE_COLUMNS, "columns", "headers", warnings)
            };
            vec![vec![String::new(); columns]; count]
        }
        RowSource::None => Vec::new(),
    };

    debug!(source = ?source, rows = rows.len(), "Expanded table");

    warnings.extend(unresolved.into_iter().map(unresolved_warning));
    ExpandedTable { headers, rows }
}

fn loop_rows(
    path: &str,
    row_template: &[Value],
    data: &Value,
    boilerplate: &Value,
    unresolved: &mut Vec<String>,
    warnings: &mut Vec<Warning>,
) -> Vec<Vec<String>> {
    let items = match resolve(data, path.trim()) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            warnings.push(
                Warning::new(
                    WarningKind::MissingLoopSource,
                    format!("Loop source '{}' is not a list; no rows emitted", path),
                )
                .about(path),
            );
            return Vec::new();
        }
        None => {
            warnings.push(
                Warning::new(
                    WarningKind::MissingLoopSource,
                    format!("Loop source '{}' not found; no rows emitted", path),
                )
                .about(path),
            );
            return Vec::new();
        }
    };

    let count = capped(items.len(), MAX_TABLE_ROWS, "rows", path, warnings);
    let width = capped(row_template.len(), MAX_TABLE_COLUMNS, "columns", "rowTemplate", warnings);
    items[..count]
        .iter()
        .map(|item| {
            row_template[..width]
                .iter()
                .map(|cell| stringify(&render_value(cell, item, boilerplate, unresolved)))
                .collect()
        })
        .collect()
}

fn library_table(reference: &str, boilerplate: &Value) -> Option<LibraryTable> {
    let id = reference.trim();
    let id = id.strip_prefix("boilerplate.").unwrap_or(id);
    let id = id.strip_prefix("tables.").unwrap_or(id);
    let raw = boilerplate.get("tables")?.get(id)?;
    LibraryTable::deserialize(raw).ok()
}

/// Clamp `len` to `limit`, warning when anything is dropped
fn capped(
    len: usize,
    limit: usize,
    unit: &str,
    source: &str,
    warnings: &mut Vec<Warning>,
) -> usize {
    if len <= limit {
        return len;
    }
    warnings.push(
        Warning::new(
            WarningKind::TableTruncated,
            format!("Table {} from '{}' cut from {} to {}", unit, source, len, limit),
        )
        .about(source),
    );
    limit
}

pub(crate) fn unresolved_warning(path: String) -> Warning {
    Warning::new(
        WarningKind::UnresolvedPlaceholder,
        format!("Placeholder '{{{{{}}}}}' could not be resolved", path),
    )
    .about(path)
}
