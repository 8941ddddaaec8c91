//! Error types for contract analysis

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Contract analysis errors
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Unresolved reference: {source_name} points at missing schema '{target}'")]
    UnresolvedReference { source_name: String, target: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid weights file: {0}")]
    InvalidWeights(#[from] toml::de::Error),
}
