//! Error types for zonespace

use thiserror::Error;

/// Main error type for zoning ingest operations
#[derive(Debug, Error)]
pub enum ZonespaceError {
    /// An attribute name or value does not conform to the canonical schema.
    ///
    /// These indicate an authoring bug in a ruleset and abort the load;
    /// no partial ruleset is ever used.
    #[error("Schema violation: {0}")]
    Schema(String),

    /// The ruleset definition itself is malformed (bad header, bad CSV).
    #[error("Ruleset error: {0}")]
    Ruleset(String),

    /// Input geometry the engine cannot work with
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Failure reading an input source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for zonespace operations
pub type Result<T> = std::result::Result<T, ZonespaceError>;
