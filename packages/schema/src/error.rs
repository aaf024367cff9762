//! Error types for the page schema

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid page JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page document must be a JSON object")]
    NotAnObject,
}

/// Non-fatal inconsistency found in a loaded page.
///
/// The editor tolerates all of these (dangling ids are skipped at render
/// time), but tooling reports them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    #[error("order references missing section '{0}'")]
    DanglingOrderId(String),

    #[error("section '{0}' is not listed in order")]
    UnorderedSection(String),

    #[error("section stored under '{key}' declares id '{id}'")]
    IdMismatch { key: String, id: String },

    #[error("id '{0}' is used more than once")]
    DuplicateId(String),
}
