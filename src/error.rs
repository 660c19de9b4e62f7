//! Error types for metadata probing and provider detection.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to an instance metadata service.
///
/// An attribute that is legitimately missing (for example an instance
/// without a public address) is never an error; it is reported as an
/// empty string by the getters.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The HTTP client could not be constructed.
    #[error("failed to create http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure: connection refused, DNS, client timeout.
    #[error("failed to fetch {target}: {source}")]
    Request {
        target: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The metadata service answered with a non-success status.
    #[error("failed to fetch {target}: received status code {status}")]
    Http { target: &'static str, status: u16 },

    /// The response body could not be read.
    #[error("failed to read {target} response body: {source}")]
    Body {
        target: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON document.
    #[error("failed to parse {what} metadata: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A provider probe did not finish within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Fetching a descriptive attribute of the detected provider failed.
    #[error("failed to get {step}: {source}")]
    Enrichment {
        step: &'static str,
        #[source]
        source: Box<MetadataError>,
    },
}

impl MetadataError {
    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            MetadataError::Http { status, .. } => Some(*status),
            MetadataError::Enrichment { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the metadata service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
