//! nscale metadata implementation.
//!
//! nscale runs on OpenStack, which serves an EC2-compatible flat tree under
//! `/latest/meta-data` (no token handshake) next to its own JSON document.

use std::net::IpAddr;

use serde::Deserialize;

use crate::client::{read_json, read_text, send, MetadataClient, METADATA};
use crate::error::MetadataError;

use super::absent_if_not_found;

/// EC2-compatible metadata root path.
const META_DATA_PATH: &str = "/latest/meta-data";

/// OpenStack metadata document path.
const OPENSTACK_METADATA_PATH: &str = "/openstack/latest/meta_data.json";

/// The parts of `meta_data.json` used for identification.
#[derive(Debug, Default, Deserialize)]
pub struct OpenStackMetadata {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub availability_zone: String,
    #[serde(default)]
    pub meta: Meta,
}

/// Free-form `meta` block set by the nscale control plane.
#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default, rename = "organizationID")]
    pub organization_id: String,
    #[serde(default, rename = "projectID")]
    pub project_id: String,
    #[serde(default, rename = "regionName")]
    pub region_name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, rename = "regionID")]
    pub region_id: String,
    #[serde(default, rename = "regionId")]
    pub region_id_alt: String,
}

impl OpenStackMetadata {
    /// Human readable region name, if any.
    ///
    /// `regionID`/`regionId` are opaque identifiers and never used here.
    pub fn best_region(&self) -> &str {
        [&self.meta.region_name, &self.meta.region]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    /// True when the document carries everything an nscale instance has.
    pub fn is_nscale(&self) -> bool {
        !self.uuid.is_empty()
            && !self.meta.organization_id.is_empty()
            && !self.meta.project_id.is_empty()
    }
}

/// Fetch a value from the EC2-compatible tree.
pub async fn fetch_metadata(client: &MetadataClient, path: &str) -> Result<String, MetadataError> {
    let url = client.url(&format!(
        "{}/{}",
        META_DATA_PATH,
        path.trim_start_matches('/')
    ));
    let response = send(client.inner().get(url), METADATA).await?;
    read_text(response, METADATA).await
}

pub async fn fetch_openstack_metadata(
    client: &MetadataClient,
) -> Result<OpenStackMetadata, MetadataError> {
    let request = client.inner().get(client.url(OPENSTACK_METADATA_PATH));
    let response = send(request, METADATA).await?;
    read_json(response, "openstack").await
}

/// 404 means no floating IP is attached.
pub async fn fetch_public_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    absent_if_not_found(fetch_metadata(client, "public-ipv4").await)
}

/// The instance's RFC1918 address, or empty for anything else.
///
/// Routable addresses are left to the caller's local interface fallback.
pub async fn fetch_private_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    let local = absent_if_not_found(fetch_metadata(client, "local-ipv4").await)?;
    Ok(private_ipv4(&local))
}

fn private_ipv4(raw: &str) -> String {
    match raw.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) if ip.is_private() => ip.to_string(),
        _ => String::new(),
    }
}

pub async fn fetch_instance_id(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_metadata(client, "instance-id").await
}

pub async fn fetch_availability_zone(client: &MetadataClient) -> Result<String, MetadataError> {
    Ok(fetch_openstack_metadata(client).await?.availability_zone)
}

pub async fn fetch_region(client: &MetadataClient) -> Result<String, MetadataError> {
    Ok(fetch_openstack_metadata(client)
        .await?
        .best_region()
        .to_string())
}

/// Returns the instance uuid when the document identifies an nscale instance.
pub async fn detect(client: &MetadataClient) -> Result<String, MetadataError> {
    let doc = fetch_openstack_metadata(client).await?;
    if doc.is_nscale() {
        Ok(doc.uuid)
    } else {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "uuid": "8d3c0f4e-5b7a-4c1e-9a2f-1e2d3c4b5a69",
        "availability_zone": "nova",
        "meta": {
            "organizationID": "org-1",
            "projectID": "proj-1",
            "regionName": "glo1",
            "regionID": "c0a1b2"
        }
    }"#;

    #[test]
    fn test_decode_document() {
        let doc: OpenStackMetadata = serde_json::from_str(DOC).unwrap();
        assert_eq!(doc.availability_zone, "nova");
        assert_eq!(doc.meta.region_id, "c0a1b2");
        assert!(doc.is_nscale());
        assert_eq!(doc.best_region(), "glo1");
    }

    #[test]
    fn test_best_region_fallback() {
        let doc: OpenStackMetadata =
            serde_json::from_str(r#"{"meta": {"region": "eu-north", "regionId": "abc"}}"#).unwrap();
        assert_eq!(doc.best_region(), "eu-north");
        assert_eq!(doc.meta.region_id_alt, "abc");
    }

    #[test]
    fn test_best_region_ignores_ids() {
        let doc: OpenStackMetadata =
            serde_json::from_str(r#"{"meta": {"regionID": "abc", "regionId": "def"}}"#).unwrap();
        assert_eq!(doc.best_region(), "");
    }

    #[test]
    fn test_is_nscale_requires_org_and_project() {
        let doc: OpenStackMetadata =
            serde_json::from_str(r#"{"uuid": "x", "meta": {"projectID": "p"}}"#).unwrap();
        assert!(!doc.is_nscale());
        let doc: OpenStackMetadata =
            serde_json::from_str(r#"{"uuid": "x", "meta": {"organizationID": "o"}}"#).unwrap();
        assert!(!doc.is_nscale());
        let doc: OpenStackMetadata = serde_json::from_str(
            r#"{"meta": {"organizationID": "o", "projectID": "p"}}"#,
        )
        .unwrap();
        assert!(!doc.is_nscale());
    }

    #[test]
    fn test_private_ipv4() {
        assert_eq!(private_ipv4("10.0.1.5"), "10.0.1.5");
        assert_eq!(private_ipv4(" 192.168.4.20\n"), "192.168.4.20");
        assert_eq!(private_ipv4("7.247.195.146"), "");
        assert_eq!(private_ipv4("fd00::1"), "");
        assert_eq!(private_ipv4("not-an-ip"), "");
        assert_eq!(private_ipv4(""), "");
    }
}
