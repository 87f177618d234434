//! Error types for the Cloud Databases client.
//!
//! # Design
//! The builder only ever produces three variants on its own:
//! `MissingParameters`, `InvalidParameter` and `UnknownOperation`. They are
//! raised before any executor call. Everything else comes from the executor
//! (`Transport`) or from decoding a response (`NotFound`, `HttpError`,
//! `DeserializationError`) and is forwarded without reclassification.

use thiserror::Error;

/// Errors returned by the builder, the dispatcher and response decoding.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more required parameters were absent (or `null`). Names are
    /// listed in the order the operation declares them.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// A parameter was present but has a shape the request slot cannot take,
    /// e.g. an object substituted into a URL path segment.
    #[error("invalid value for parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// No operation with this name exists in the operation table.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The server returned 404; the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A caller-supplied value could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The executor failed before a response was produced.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// The missing parameter names when this is `MissingParameters`.
    pub fn missing_parameters(&self) -> Option<&[String]> {
        match self {
            ApiError::MissingParameters(names) => Some(names),
            _ => None,
        }
    }
}
