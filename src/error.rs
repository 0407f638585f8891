//! Error types for the entry pipeline.
//!
//! Failures coming from the vision model are absorbed by the fallback policy,
//! so only `EntryError` ever reaches a caller.

use std::time::Duration;

use axum::http::StatusCode;

/// Candidate failed the required-field/type schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("candidate is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has unsupported type {kind}")]
    UnsupportedType { field: &'static str, kind: &'static str },

    #[error("field `{field}` is not a valid amount: {value}")]
    InvalidAmount { field: &'static str, value: String },
}

/// Failure to turn an image into a candidate record.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("unsupported image format `{0}`, use JPEG or PNG")]
    UnsupportedFormat(String),

    #[error("vision request failed: {0}")]
    Remote(#[source] anyhow::Error),

    #[error("vision request timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not decode vision response: {reason}")]
    Decode { raw: String, reason: String },

    #[error("vision response failed validation: {0}")]
    Validation(#[from] ValidationError),
}

/// Rejected manual entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManualInputError {
    #[error("food name is required")]
    EmptyName,

    #[error("`{0}` is required")]
    Missing(&'static str),

    #[error("`{field}` must be a number, got {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("`{0}` must be a whole number")]
    NotInteger(&'static str),

    #[error("`{0}` cannot be negative")]
    Negative(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    UnsupportedFormat(ExtractionError),

    #[error("invalid manual input: {0}")]
    InvalidManualInput(#[from] ManualInputError),

    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl EntryError {
    pub fn status(&self) -> StatusCode {
        match self {
            EntryError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            EntryError::InvalidManualInput(_) => StatusCode::BAD_REQUEST,
            EntryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
