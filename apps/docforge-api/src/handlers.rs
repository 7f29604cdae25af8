//! HTTP handlers for the Docforge API

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use docforge_engine::{
    generate_async, is_valid, validate as validate_record, visible_fields, GenerateRequest,
    GenerateResponse, OutputFormat, WarningKind,
};

use crate::error::ApiError;
use crate::models::{FormRequest, ValidateResponse, VisibilityResponse};
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Assemble and render a document, returning the artifact and an HTML preview
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    let response = generate_async(request, state.config.timeout_ms).await?;
    // Assembly warnings are logged by the engine
    for warning in response
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::Validation)
    {
        tracing::warn!(subject = ?warning.subject, "{}", warning);
    }
    Ok(Json(response))
}

/// Render the request as a standalone HTML page
pub async fn preview(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Html<String>, ApiError> {
    let Json(mut request) = payload?;
    request.format = OutputFormat::Html;
    let response = generate_async(request, state.config.timeout_ms).await?;
    let page = match response.artifact {
        Some(artifact) => String::from_utf8(artifact.data)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("preview encoding: {}", e)))?,
        None => response.preview_html,
    };
    Ok(Html(page))
}

/// Field ids visible under the submitted data
pub async fn visibility(
    payload: Result<Json<FormRequest>, JsonRejection>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    let Json(request) = payload?;
    let visible = visible_fields(&request.schema, &request.data)
        .into_iter()
        .collect();
    Ok(Json(VisibilityResponse { visible }))
}

/// Check the submitted data against the schema
pub async fn validate(
    payload: Result<Json<FormRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(request) = payload?;
    let issues = validate_record(&request.schema, &request.data);
    Ok(Json(ValidateResponse {
        valid: is_valid(&issues),
        issues,
    }))
}
