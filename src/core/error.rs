//! Domain errors for the trace-to-script transformation.
//!
//! Both kinds are propagation-only: a bad request aborts building that
//! request's expression and the caller decides whether to skip or abort.

use crate::core::request::HttpMethod;
use thiserror::Error;

/// Errors surfaced while turning captured requests into call expressions.
#[derive(Debug, Error)]
pub enum Error {
    /// The postData descriptor attached to a request is structurally
    /// broken. Carries the offending descriptor for diagnostics.
    #[error("invalid HAR postData object: {descriptor}")]
    InvalidPayload {
        descriptor: serde_json::Value,
        #[source]
        defect: PayloadDefect,
    },

    /// The HTTP verb has no call-building rule.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(HttpMethod),

    /// The task was built without a request binding (the direct
    /// construction path) and cannot be rendered yet.
    #[error("task '{0}' has no statements to render")]
    EmptyTask(String),
}

/// Structural defects inside a postData descriptor.
#[derive(Debug, Error)]
pub enum PayloadDefect {
    #[error("postData is not an object")]
    NotAnObject,

    #[error("missing \"mimeType\" field")]
    MissingMimeType,

    #[error("should contain \"text\" or \"params\"")]
    MissingBody,

    #[error("missing \"text\" field for application/json content")]
    MissingJsonText,

    #[error("the \"text\" field should be a string")]
    TextNotAString,

    #[error("unreadable JSON from field \"text\"")]
    UnreadableJson(#[source] serde_json::Error),

    #[error("the \"params\" field should be a list")]
    ParamsNotAList,

    #[error("params entry {index} is missing \"{key}\"")]
    ParamMissingKey { index: usize, key: &'static str },

    #[error("params entry {index} has a non-string \"{key}\"")]
    ParamNotAString { index: usize, key: &'static str },
}
