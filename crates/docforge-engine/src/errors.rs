//! Error and warning types for assembly, rendering and form handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of an advisory warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnresolvedPlaceholder,
    UnknownOperator,
    UnrecognizedContent,
    MissingLoopSource,
    MissingLibraryTable,
    TableTruncated,
    Validation,
}

/// A non-fatal anomaly, surfaced to the document author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Human-readable message
    pub message: String,
    /// Where in the skeleton the anomaly was found, e.g. `sections[1].content[0]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Offending placeholder path, field id or operator name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            subject: None,
        }
    }

    /// Set the location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the subject
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} (at {})", self.message, location),
            None => f.write_str(&self.message),
        }
    }
}

/// Hard failures of the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Structure has no sections")]
    MissingSections,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document packaging failed: {0}")]
    Package(String),

    #[error("Generation timeout after {0}ms")]
    Timeout(u64),

    #[error("Generation task failed: {0}")]
    TaskFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for EngineError {
    fn from(err: zip::result::ZipError) -> Self {
        EngineError::Package(err.to_string())
    }
}

/// Errors from mutating an in-progress form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is not a table")]
    NotATable(String),

    #[error("Table '{field}' must keep between {min} and {max} rows")]
    RowLimit {
        field: String,
        min: usize,
        max: String,
    },

    #[error("Table '{field}' has no row {index}")]
    RowIndex { field: String, index: usize },

    #[error("Table '{0}' must be set to a list of rows")]
    NotRows(String),

    #[error("Path '{0}' does not name an existing row")]
    InvalidPath(String),

    #[error("Cannot set empty path")]
    EmptyPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_builder_and_display() {
        let warning = Warning::new(WarningKind::UnresolvedPlaceholder, "Unresolved placeholder")
            .at("sections[0].heading")
            .about("project");
        assert_eq!(warning.subject.as_deref(), Some("project"));
        assert_eq!(
            warning.to_string(),
            "Unresolved placeholder (at sections[0].heading)"
        );
    }

    #[test]
    fn test_warning_kind_serializes_snake_case() {
        let json = serde_json::to_value(WarningKind::MissingLoopSource).unwrap();
        assert_eq!(json, "missing_loop_source");
    }
}
