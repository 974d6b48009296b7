//! Error types for sm-core

use thiserror::Error;

/// Core error type for SalesMart
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Raw input file not found
    #[error("[E004] Raw input not found: {path}")]
    InputNotFound { path: String },

    /// E005: Raw input could not be read as delimited text
    #[error("[E005] Failed to read '{path}': {message}")]
    CsvRead { path: String, message: String },

    /// E006: Prepared output could not be written
    #[error("[E006] Failed to write '{path}': {message}")]
    CsvWrite { path: String, message: String },

    /// E007: Unknown entity name
    #[error("[E007] Unknown entity '{name}'. Expected one of: customer, product, sale")]
    UnknownEntity { name: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
