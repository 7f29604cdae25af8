//! Form field visibility
//!
//! [`visible_fields`] is a pure function of the schema and the data record.
//! [`FormState`] wraps an in-progress record and recomputes visibility after
//! every mutation, keeping table row counts within their bounds.

use std::collections::BTreeSet;

use docforge_types::{ColumnKind, FieldKind, Schema, TableBounds, TableFieldSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::condition::evaluate;
use crate::errors::FormError;

/// Ids of the fields whose conditional clause holds for `data`
pub fn visible_fields(schema: &Schema, data: &Value) -> BTreeSet<String> {
    schema
        .fields()
        .filter(|field| evaluate(field.conditional.as_ref(), data))
        .map(|field| field.id.clone())
        .collect()
}

/// Fields that appeared or disappeared after a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityChange {
    pub shown: Vec<String>,
    pub hidden: Vec<String>,
}

impl VisibilityChange {
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.hidden.is_empty()
    }
}

/// An in-progress data record bound to its schema
///
/// Table fields always hold a list of rows within their bounds.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    data: Value,
    visible: BTreeSet<String>,
}

impl FormState {
    /// Start an empty record; table fields get their default row count
    pub fn new(schema: Schema) -> Self {
        Self::with_data(schema, Value::Object(Map::new()))
    }

    /// Resume from an existing record
    ///
    /// Missing table fields are seeded with their default rows. Existing
    /// row lists are padded up to `minRows` and cut down to `maxRows`.
    pub fn with_data(schema: Schema, data: Value) -> Self {
        let mut data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for field in schema.fields() {
            let FieldKind::Table(spec) = &field.kind else {
                continue;
            };
            let bounds = spec.bounds();
            let rows = match data.remove(&field.id) {
                Some(Value::Array(mut rows)) => {
                    let target = bounds.clamp(rows.len());
                    rows.truncate(target);
                    rows.resize_with(target, || empty_row(spec));
                    rows
                }
                _ => (0..bounds.initial_rows()).map(|_| empty_row(spec)).collect(),
            };
            data.insert(field.id.clone(), Value::Array(rows));
        }
        let data = Value::Object(data);
        let visible = visible_fields(&schema, &data);
        Self {
            schema,
            data,
            visible,
        }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn visible(&self) -> &BTreeSet<String> {
        &self.visible
    }

    pub fn is_visible(&self, field_id: &str) -> bool {
        self.visible.contains(field_id)
    }

    /// Set a value at a dotted path
    ///
    /// Objects are created along the way; lists are walked by numeric index
    /// and must already hold that index. Replacing a whole table field needs
    /// a list of rows within its bounds.
    pub fn set(&mut self, path: &str, value: Value) -> Result<VisibilityChange, FormError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(FormError::EmptyPath);
        }
        if let [field_id] = segments.as_slice() {
            if let Some(bounds) = self.table_bounds(field_id) {
                let rows = value
                    .as_array()
                    .ok_or_else(|| FormError::NotRows(field_id.to_string()))?;
                if !bounds.contains(rows.len()) {
                    return Err(row_limit(field_id, bounds));
                }
            }
        }

        let Some((last, parents)) = segments.split_last() else {
            return Err(FormError::EmptyPath);
        };
        let mut current = &mut self.data;
        for segment in parents {
            current = descend(current, segment, path)?;
        }
        *descend(current, last, path)? = value;
        Ok(self.refresh())
    }

    /// Remove the value at a top-level field id
    ///
    /// A table field is emptied instead, which fails when it needs rows.
    pub fn clear(&mut self, field_id: &str) -> Result<VisibilityChange, FormError> {
        match self.table_bounds(field_id) {
            Some(bounds) if bounds.min_rows > 0 => return Err(row_limit(field_id, bounds)),
            Some(_) => *child_entry(&mut self.data, field_id) = Value::Array(Vec::new()),
            None => {
                if let Some(map) = self.data.as_object_mut() {
                    map.remove(field_id);
                }
            }
        }
        Ok(self.refresh())
    }

    /// Append an empty row to a table field, respecting `maxRows`
    pub fn add_row(&mut self, field_id: &str) -> Result<usize, FormError> {
        let (spec, bounds) = self.table_spec(field_id)?;
        let rows = self.rows_mut(field_id);
        if !bounds.contains(rows.len() + 1) {
            return Err(row_limit(field_id, bounds));
        }
        rows.push(empty_row(&spec));
        let count = rows.len();
        self.refresh();
        Ok(count)
    }

    /// Remove a row from a table field, respecting `minRows`
    pub fn remove_row(&mut self, field_id: &str, index: usize) -> Result<usize, FormError> {
        let (_, bounds) = self.table_spec(field_id)?;
        let rows = self.rows_mut(field_id);
        if index >= rows.len() {
            return Err(FormError::RowIndex {
                field: field_id.to_string(),
                index,
            });
        }
        if rows.len() <= bounds.min_rows {
            return Err(row_limit(field_id, bounds));
        }
        rows.remove(index);
        let count = rows.len();
        self.refresh();
        Ok(count)
    }

    fn table_spec(&self, field_id: &str) -> Result<(TableFieldSpec, TableBounds), FormError> {
        let field = self
            .schema
            .field(field_id)
            .ok_or_else(|| FormError::UnknownField(field_id.to_string()))?;
        match &field.kind {
            FieldKind::Table(spec) => Ok((spec.clone(), spec.bounds())),
            _ => Err(FormError::NotATable(field_id.to_string())),
        }
    }

    fn table_bounds(&self, field_id: &str) -> Option<TableBounds> {
        self.table_spec(field_id).ok().map(|(_, bounds)| bounds)
    }

    fn rows_mut(&mut self, field_id: &str) -> &mut Vec<Value> {
        let slot = child_entry(&mut self.data, field_id);
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(rows) => rows,
            _ => unreachable!("slot was just replaced by an array"),
        }
    }

    fn refresh(&mut self) -> VisibilityChange {
        let next = visible_fields(&self.schema, &self.data);
        let change = VisibilityChange {
            shown: next.difference(&self.visible).cloned().collect(),
            hidden: self.visible.difference(&next).cloned().collect(),
        };
        self.visible = next;
        change
    }
}

fn empty_row(spec: &TableFieldSpec) -> Value {
    let row = spec
        .columns
        .iter()
        .map(|column| {
            let blank = match column.kind {
                ColumnKind::Number => Value::Null,
                ColumnKind::Text | ColumnKind::Date | ColumnKind::Select => {
                    Value::String(String::new())
                }
            };
            (column.key.clone(), blank)
        })
        .collect();
    Value::Object(row)
}

fn row_limit(field_id: &str, bounds: TableBounds) -> FormError {
    FormError::RowLimit {
        field: field_id.to_string(),
        min: bounds.min_rows,
        max: bounds
            .max_rows
            .map_or_else(|| "unbounded".to_string(), |max| max.to_string()),
    }
}

fn child_entry<'v>(value: &'v mut Value, key: &str) -> &'v mut Value {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map.entry(key.to_string()).or_insert(Value::Null),
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Step one path segment into `value`
fn descend<'v>(
    value: &'v mut Value,
    segment: &str,
    path: &str,
) -> Result<&'v mut Value, FormError> {
    match value {
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) if index < items.len() => Ok(&mut items[index]),
            _ => Err(FormError::InvalidPath(path.to_string())),
        },
        other => Ok(child_entry(other, segment)),
    }
}
