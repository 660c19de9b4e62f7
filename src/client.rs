//! HTTP client wrapper for metadata requests.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::MetadataError;

/// Default timeout for a single metadata round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Link-local metadata address shared by AWS, Azure and OpenStack clouds.
pub const LINK_LOCAL_BASE_URL: &str = "http://169.254.169.254";

/// GCP metadata server host.
pub const GCP_BASE_URL: &str = "http://metadata.google.internal";

/// Error target for metadata reads.
pub(crate) const METADATA: &str = "metadata";

/// HTTP client wrapper for metadata service requests.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    inner: Client,
    base_url: String,
}

impl MetadataClient {
    /// Create a new metadata client with the specified timeout and base URL.
    pub fn new(timeout: Duration, base_url: &str) -> Result<Self, MetadataError> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MetadataError::Client)?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new metadata client with the default timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self, MetadataError> {
        Self::new(DEFAULT_TIMEOUT, base_url)
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Join `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Send a request, turning transport failures and non-success statuses
/// into errors attributed to `target`.
pub(crate) async fn send(
    request: RequestBuilder,
    target: &'static str,
) -> Result<Response, MetadataError> {
    let response = request
        .send()
        .await
        .map_err(|source| MetadataError::Request { target, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(MetadataError::Http {
            target,
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Read a text body with surrounding whitespace removed.
pub(crate) async fn read_text(
    response: Response,
    target: &'static str,
) -> Result<String, MetadataError> {
    let text = response
        .text()
        .await
        .map_err(|source| MetadataError::Body { target, source })?;
    Ok(text.trim().to_string())
}

/// Read and decode a JSON body. `what` names the document in decode errors.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    what: &'static str,
) -> Result<T, MetadataError> {
    let body = response.bytes().await.map_err(|source| MetadataError::Body {
        target: METADATA,
        source,
    })?;
    serde_json::from_slice(&body).map_err(|source| MetadataError::Json { what, source })
}
