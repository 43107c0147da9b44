//! Error types for loading matches and configuration.
//!
//! Analysis itself never fails; these only cover the I/O edges.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("missing required CSV column: {column}")]
    MissingColumn { column: String },

    #[error("unsupported match file format: {path}")]
    UnsupportedFormat { path: PathBuf },
}
