//! Error types for architecture assembly

use thiserror::Error;

/// Errors raised while decoding state exports or assembling documents.
///
/// Unresolved foreign keys are deliberately absent here: an orphan subnet or
/// instance is excluded from the tree, never reported as a failure.
#[derive(Debug, Error)]
pub enum ArchError {
    /// A record of a recognized kind lacks an attribute its kind requires
    #[error("{kind} resource '{name}' is missing required attribute '{field}'")]
    MissingField {
        kind: &'static str,
        name: String,
        field: &'static str,
    },

    /// The resource list (or a fragment field) is absent or has the wrong shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error from a collaborator that reads or writes documents
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for architecture operations
pub type ArchResult<T> = Result<T, ArchError>;

impl ArchError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ArchError::MalformedInput(msg.into())
    }
}
