//! # Error Types
//!
//! This module defines the error types used throughout the folio library,
//! plus the [`Diagnostic`] records the render pipeline collects for
//! conditions it recovers from.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    /// Template is structurally invalid
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// A bound value cannot be used for the target property
    #[error("Binding type error: {0}")]
    BindingType(String),

    /// An image could not be fetched or decoded
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Element type this version does not know how to render
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    /// No element with the given id exists in the template
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An element id is already used in the template
    #[error("Duplicate element id: {0}")]
    DuplicateElement(String),

    /// PDF encoding error
    #[error("Encode error: {0}")]
    Encode(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Every structural problem found in a template, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.issues.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for FolioError {
    fn from(err: ValidationError) -> Self {
        FolioError::Validation(err)
    }
}

/// Category of a recoverable render condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Bound value unsuitable for the property; literal used instead.
    BindingType,
    /// Image fetch failed; element painted nothing.
    ResourceUnavailable,
    /// Element type unknown; element skipped.
    UnknownElementType,
    /// Property value unparsable (e.g. a color); default used instead.
    InvalidProperty,
    /// Page size unrecognized with validation off; A4 portrait used instead.
    InvalidPage,
}

/// A recoverable condition hit while rendering one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Offending element, `None` for template-level conditions.
    pub element_id: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn for_element(
        element_id: impl Into<String>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            element_id: Some(element_id.into()),
            kind,
            message: message.into(),
        }
    }

    pub fn for_template(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            element_id: None,
            kind,
            message: message.into(),
        }
    }

    /// Build a diagnostic from a recovered error.
    ///
    /// Errors that have no recoverable category map to `ResourceUnavailable`,
    /// which is the only other failure an element can hit mid-render.
    pub fn from_error(element_id: impl Into<String>, err: &FolioError) -> Self {
        let kind = match err {
            FolioError::BindingType(_) => DiagnosticKind::BindingType,
            FolioError::UnknownElementType(_) => DiagnosticKind::UnknownElementType,
            _ => DiagnosticKind::ResourceUnavailable,
        };
        Self::for_element(element_id, kind, err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element_id {
            Some(id) => write!(f, "[{}] {}", id, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
