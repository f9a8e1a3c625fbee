// src/utils/error.rs
use thiserror::Error;

/// A byte sequence that is not valid in the encoding it was decoded with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed {encoding} byte sequence at offset {offset}")]
pub struct DecodeFailure {
    pub encoding: &'static str,
    pub offset: usize,
}

/// The only fatal condition of the core: neither encoding produced a parseable document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse document as {primary} or {fallback}: {cause}")]
pub struct DocumentParseError {
    pub primary: &'static str,
    pub fallback: &'static str,
    #[source]
    pub cause: DecodeFailure, // Last underlying cause (the fallback attempt)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatcherError {
    #[error("Fuzzy threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),

    #[error("Cascade matcher requires at least one strategy")]
    EmptyCascade,
}

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Invalid TOC YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOC JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report type '{requested}' not found in TOC configuration (available: {available:?})")]
    UnknownReportType {
        requested: String,
        available: Vec<String>,
    },

    #[error("Taxonomy entry has a blank {0}")]
    BlankField(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown text encoding label: {0}")]
    UnknownEncoding(String),

    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid report metadata: {field} = '{value}' ({expected})")]
    InvalidMetadata {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("A section sequence needs at least one record")]
    EmptySequence,

    #[error("Records from different reports cannot share a sequence: {0} and {1}")]
    MixedReports(String, String),
}
