//! One-call generation: assemble, render, package
//!
//! [`generate`] runs the whole synchronous pipeline for one request.
//! [`generate_async`] moves it onto the blocking pool under a timeout.

use docforge_types::{ContentLibrary, DocumentTree, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::assembler::{assemble, parse_structure};
use crate::errors::{EngineError, Warning};
use crate::render::{render_docx, render_html, render_html_page, OutputFormat};
use crate::validate::validate;

const DEFAULT_TITLE: &str = "document";

/// Request to generate a document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Form schema; when present the record is validated first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub content: ContentLibrary,
    /// Raw skeleton, checked for a non-empty `sections` array
    pub structure: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub format: OutputFormat,
    /// Used for the preview page title and the artifact file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateStatus {
    Success,
    SuccessWithWarnings,
}

/// Response from generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub status: GenerateStatus,
    pub tree: DocumentTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<RenderArtifact>,
    /// HTML fragment of the same tree
    pub preview_html: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Rendered artifact; the payload travels as base64 in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderArtifact {
    #[serde(rename = "dataBase64", with = "base64_payload")]
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub size_bytes: usize,
}

impl RenderArtifact {
    fn new(data: Vec<u8>, format: OutputFormat, title: &str) -> Self {
        Self {
            size_bytes: data.len(),
            mime_type: format.mime_type().to_string(),
            file_name: format!("{}.{}", file_stem(title), format.extension()),
            data,
        }
    }
}

mod base64_payload {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Generate a document synchronously
pub fn generate(request: GenerateRequest) -> Result<GenerateResponse, EngineError> {
    let structure = parse_structure(request.structure)?;

    let mut warnings: Vec<Warning> = match &request.schema {
        Some(schema) => validate(schema, &request.data)
            .into_iter()
            .map(Warning::from)
            .collect(),
        None => Vec::new(),
    };

    let assembly = assemble(&structure, &request.content, &request.data)?;
    warnings.extend(assembly.warnings);

    let title = request.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let bytes = match request.format {
        OutputFormat::Docx => render_docx(&assembly.tree)?,
        OutputFormat::Html => render_html_page(&assembly.tree, title).into_bytes(),
    };
    let artifact = RenderArtifact::new(bytes, request.format, title);
    let preview_html = render_html(&assembly.tree);

    let stats = assembly.tree.stats();
    info!(
        format = %request.format,
        sections = stats.sections,
        paragraphs = stats.paragraphs,
        tables = stats.tables,
        bytes = artifact.size_bytes,
        warnings = warnings.len(),
        "Generated document"
    );

    let status = if warnings.is_empty() {
        GenerateStatus::Success
    } else {
        GenerateStatus::SuccessWithWarnings
    };
    Ok(GenerateResponse {
        status,
        tree: assembly.tree,
        artifact: Some(artifact),
        preview_html,
        warnings,
    })
}

/// Generate on the blocking pool with a timeout
#[cfg(feature = "server")]
pub async fn generate_async(
    request: GenerateRequest,
    timeout_ms: u64,
) -> Result<GenerateResponse, EngineError> {
    use std::time::Duration;

    let result = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        tokio::task::spawn_blocking(move || generate(request)),
    )
    .await;

    match result {
        Ok(Ok(response)) => response,
        Ok(Err(join_error)) => Err(EngineError::TaskFailed(join_error.to_string())),
        Err(_timeout) => Err(EngineError::Timeout(timeout_ms)),
    }
}

/// File-system friendly stem for a document title
fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        stem.to_string()
    }
}
