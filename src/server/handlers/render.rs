//! Render, preview, and validation handlers.

use axum::{
    Json,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::super::state::AppState;
use crate::error::{Diagnostic, FolioError};
use crate::template::Template;

/// Number of recovered conditions hit while rendering.
const DIAGNOSTICS_HEADER: HeaderName = HeaderName::from_static("x-folio-diagnostics");

/// Body of render and preview requests.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub template: Template,
    /// Data context; absent means every mapping is missing.
    #[serde(default)]
    pub data: Value,
}

/// Body of validation responses.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub issues: Vec<String>,
}

fn error_response(err: FolioError) -> (StatusCode, String) {
    let status = match err {
        FolioError::Validation(_) | FolioError::Json(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

fn with_body(content_type: &'static str, diagnostics: &[Diagnostic], body: Vec<u8>) -> Response {
    for diagnostic in diagnostics {
        log::warn!("render diagnostic: {}", diagnostic);
    }
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (DIAGNOSTICS_HEADER, HeaderValue::from(diagnostics.len())),
        ],
        body,
    )
        .into_response()
}

/// Handle POST /api/render - render a template against data as PDF.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, (StatusCode, String)> {
    log::info!("render '{}' ({} elements)", req.template.id, req.template.elements.len());
    let output = state
        .renderer
        .render(&req.template, &req.data)
        .await
        .map_err(error_response)?;
    Ok(with_body("application/pdf", &output.diagnostics, output.document))
}

/// Handle POST /api/preview - render a template against data as PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, (StatusCode, String)> {
    let page = state
        .renderer
        .render_page(&req.template, &req.data)
        .await
        .map_err(error_response)?;
    let png = page.to_png().map_err(error_response)?;
    Ok(with_body("image/png", &page.diagnostics, png))
}

/// Handle POST /api/validate - check a template's structure.
pub async fn validate(Json(template): Json<Template>) -> Json<ValidateResponse> {
    let issues = match template.validate() {
        Ok(()) => Vec::new(),
        Err(err) => err.issues,
    };
    Json(ValidateResponse {
        valid: issues.is_empty(),
        issues,
    })
}
