//! Request and response bodies for the Docforge API

use docforge_engine::types::Schema;
use docforge_engine::ValidationIssue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema plus the in-progress data record
#[derive(Debug, Clone, Deserialize)]
pub struct FormRequest {
    pub schema: Schema,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityResponse {
    /// Visible field ids, sorted
    pub visible: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}
