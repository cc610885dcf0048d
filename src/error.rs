//! Error types for the investment model

use thiserror::Error;

/// Result alias used across the library
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Invalid parameters, raised before any schedule is built
    #[error("Invalid configuration: {field} - {reason}")]
    Configuration { field: String, reason: String },

    #[error("Division undefined in {context}")]
    DivisionUndefined { context: String },

    /// Malformed JSON or CSV input
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ModelError {
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field for configuration errors
    pub fn field(&self) -> Option<&str> {
        match self {
            ModelError::Configuration { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Parse(e.to_string())
    }
}

impl From<csv::Error> for ModelError {
    fn from(e: csv::Error) -> Self {
        ModelError::Parse(e.to_string())
    }
}
