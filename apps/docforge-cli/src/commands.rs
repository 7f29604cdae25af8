//! Subcommand implementations

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use docforge_engine::types::{ContentLibrary, Schema};
use docforge_engine::{
    generate, is_valid, validate, visible_fields, GenerateRequest, OutputFormat, Severity,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_optional<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => read_json(path),
        None => Ok(T::default()),
    }
}

/// Build a generation request from files on disk
pub fn load_request(
    structure: &Path,
    content: Option<&Path>,
    data: Option<&Path>,
    schema: Option<&Path>,
    format: OutputFormat,
    title: Option<String>,
) -> Result<GenerateRequest> {
    Ok(GenerateRequest {
        schema: schema.map(read_json::<Schema>).transpose()?,
        content: read_optional::<ContentLibrary>(content)?,
        structure: read_json(structure)?,
        data: read_optional::<Value>(data)?,
        format,
        title,
    })
}

pub fn load_form(schema: &Path, data: Option<&Path>) -> Result<(Schema, Value)> {
    Ok((read_json(schema)?, read_optional(data)?))
}

/// Generate the document and write it to `output`, or stdout for HTML
pub fn render(request: GenerateRequest, output: Option<&Path>, strict: bool) -> Result<()> {
    let format = request.format;
    let response = generate(request)?;

    for warning in &response.warnings {
        warn!(kind = ?warning.kind, "{}", warning);
    }
    if strict && !response.warnings.is_empty() {
        bail!("{} warning(s) produced in strict mode", response.warnings.len());
    }

    let Some(artifact) = response.artifact else {
        bail!("No artifact was produced");
    };
    let bytes = artifact.data;

    match (output, format) {
        (Some(path), _) => {
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "Wrote document");
        }
        (None, OutputFormat::Html) => {
            std::io::stdout().write_all(&bytes)?;
        }
        (None, OutputFormat::Docx) => bail!("--output is required for docx"),
    }
    Ok(())
}

/// Visible field ids in sorted order
pub fn visible(schema: &Schema, data: &Value) -> Vec<String> {
    visible_fields(schema, data).into_iter().collect()
}

/// Print validation issues; fails when any issue blocks submission
pub fn check(schema: &Schema, data: &Value) -> Result<()> {
    let issues = validate(schema, data);
    for issue in &issues {
        let tag = match issue.severity {
            Severity::Error => "error",
            Severity::Advisory => "note",
        };
        println!("{}: {}: {}", tag, issue.field, issue.message);
    }
    if !is_valid(&issues) {
        bail!("Data record is not valid");
    }
    Ok(())
}
