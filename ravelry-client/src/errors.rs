//! Error types for the Ravelry client and the record normalizer.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for Ravelry API calls.
#[derive(Debug, Error)]
pub enum RavelryError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Configured URL is not http(s).
    #[error("invalid url in {var}: {value}")]
    InvalidUrl { var: &'static str, value: String },

    /// Underlying HTTP transport error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Reasons a single raw pattern cannot become a `PatternRecord`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The raw pattern is not a JSON object.
    #[error("pattern payload is not an object")]
    NotAnObject,

    /// A required field is absent or has the wrong type.
    #[error("required field `{0}` is missing or invalid")]
    MissingField(&'static str),
}
