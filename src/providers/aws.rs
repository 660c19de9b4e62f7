//! AWS IMDSv2 metadata implementation.

use crate::client::{read_text, send, MetadataClient, METADATA};
use crate::error::MetadataError;

use super::absent_if_not_found;

/// AWS IMDSv2 token endpoint path.
const TOKEN_PATH: &str = "/latest/api/token";

/// AWS instance metadata root path.
const META_DATA_PATH: &str = "/latest/meta-data";

/// Token TTL header name.
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";

/// Token header name for requests.
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Session token lifetime requested from IMDS (6 hours).
const TOKEN_TTL_SECONDS: u32 = 21600;

const TOKEN: &str = "IMDS token";

/// Get an IMDSv2 session token.
pub async fn fetch_token(client: &MetadataClient) -> Result<String, MetadataError> {
    let request = client
        .inner()
        .put(client.url(TOKEN_PATH))
        .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS.to_string());

    let response = send(request, TOKEN).await?;
    read_text(response, TOKEN).await
}

/// Fetch a metadata value by path relative to `/latest/meta-data`.
///
/// A fresh token is requested first; if that fails no metadata request is made.
pub async fn fetch_metadata(client: &MetadataClient, path: &str) -> Result<String, MetadataError> {
    let token = fetch_token(client).await?;

    let url = client.url(&format!(
        "{}/{}",
        META_DATA_PATH,
        path.trim_start_matches('/')
    ));
    let request = client.inner().get(&url).header(TOKEN_HEADER, &token);

    let response = send(request, METADATA).await?;
    read_text(response, METADATA).await
}

pub async fn fetch_availability_zone(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_metadata(client, "placement/availability-zone").await
}

pub async fn fetch_region(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_metadata(client, "placement/region").await
}

/// Instances without a public address answer 404, reported as empty.
pub async fn fetch_public_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    absent_if_not_found(fetch_metadata(client, "public-ipv4").await)
}

pub async fn fetch_local_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    absent_if_not_found(fetch_metadata(client, "local-ipv4").await)
}

pub async fn fetch_instance_id(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_metadata(client, "instance-id").await
}

/// A non-empty availability zone means we are on AWS.
pub async fn detect(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_availability_zone(client).await
}
