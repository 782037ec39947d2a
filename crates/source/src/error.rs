//! Typed error enum for the source crate.

use thiserror::Error;

/// Errors from fetching or decoding the source payload.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure: DNS, connect, TLS, timeout, truncated body.
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    /// The body is not a JSON array of complete institution records.
    #[error("malformed payload: {source} (body: {body})")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl SourceError {
    /// Whether this is a payload problem rather than a transport one.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
