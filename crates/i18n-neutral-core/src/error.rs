//! Error types for schema rewriting and document access.

use thiserror::Error;

/// Errors raised while building or rewriting a schema.
///
/// Every variant is a load-time failure: the schema definition or the plugin
/// options must be fixed, there is nothing to retry.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("i18n-neutral plugin applies only to Strings (`{path}` is {found})")]
    TypeMismatch { path: String, found: String },

    #[error("Schema definition error at `{path}`: {message}")]
    Definition { path: String, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by per-document reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Path `{0}` is not in schema")]
    UnknownPath(String),

    #[error("Cast to {expected} failed for value at path `{path}`")]
    Cast { path: String, expected: String },

    #[error("No virtual registered at `{0}`")]
    UnknownVirtual(String),

    #[error("Virtual `{0}` is read-only")]
    ReadOnlyVirtual(String),

    #[error("Document root must be a JSON object")]
    NotAnObject,
}
