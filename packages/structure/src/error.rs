//! Error types for structure extraction.
//!
//! Uses the dual-error pattern: `StructureError` is reserved for conditions
//! the pipeline cannot recover from (bad input, bad configuration, I/O).
//! Everything the core can degrade around is recorded as a finding in the
//! `ProcessingReport` instead.

use thiserror::Error;

/// Main error type for the structure extraction library.
#[derive(Debug, Error)]
pub enum StructureError {
    /// The document text is empty or whitespace only.
    #[error("Input text is empty; nothing to extract")]
    EmptyInput,

    /// A pattern in a language profile failed to compile.
    #[error("Invalid pattern '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    /// A language profile is incomplete or inconsistent.
    #[error("Invalid pattern profile: {0}")]
    InvalidProfile(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Some documents of a batch could not be processed.
    #[error("{failed} of {total} documents failed")]
    BatchFailed { failed: usize, total: usize },
}

/// Result type alias for structure extraction operations.
pub type Result<T> = std::result::Result<T, StructureError>;
