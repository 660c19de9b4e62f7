//! GCP metadata implementation.

use serde::Deserialize;

use crate::client::{read_json, read_text, send, MetadataClient, METADATA};
use crate::error::MetadataError;

/// GCP metadata service base path.
const METADATA_PATH: &str = "/computeMetadata/v1";

/// Required header for GCP metadata requests.
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";

/// Required header value for GCP metadata requests.
const METADATA_FLAVOR_VALUE: &str = "Google";

/// One entry of `instance/network-interfaces/?recursive=true`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(default)]
    pub external_ip: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

fn get(client: &MetadataClient, path: &str) -> reqwest::RequestBuilder {
    let url = client.url(&format!(
        "{}/{}",
        METADATA_PATH,
        path.trim_start_matches('/')
    ));
    client
        .inner()
        .get(url)
        .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
}

/// Fetch a metadata value by path relative to `/computeMetadata/v1`.
pub async fn fetch_metadata(client: &MetadataClient, path: &str) -> Result<String, MetadataError> {
    let response = send(get(client, path), METADATA).await?;
    read_text(response, METADATA).await
}

/// Fetch the zone name, e.g. `us-east5-c`.
pub async fn fetch_availability_zone(client: &MetadataClient) -> Result<String, MetadataError> {
    let zone = fetch_metadata(client, "instance/zone").await?;
    Ok(extract_zone_from_path(&zone))
}

/// The metadata server answers `projects/<num>/zones/<zone>`; keep the part
/// after the last `/`. A trailing slash therefore yields an empty zone.
pub fn extract_zone_from_path(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[idx + 1..].to_string(),
        None => path.to_string(),
    }
}

/// Region is the zone without its final `-<letter>` suffix.
pub fn region_from_zone(zone: &str) -> String {
    match zone.rsplit_once('-') {
        Some((region, _)) => region.to_string(),
        None => String::new(),
    }
}

pub async fn fetch_network_interfaces(
    client: &MetadataClient,
) -> Result<Vec<NetworkInterface>, MetadataError> {
    let request = get(client, "instance/network-interfaces/").query(&[("recursive", "true")]);
    let response = send(request, METADATA).await?;
    read_json(response, "network interface").await
}

/// First non-empty external address across all interfaces, or empty.
pub async fn fetch_public_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    let interfaces = fetch_network_interfaces(client).await?;
    Ok(first_external_ip(&interfaces))
}

pub async fn fetch_private_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    let interfaces = fetch_network_interfaces(client).await?;
    Ok(interfaces
        .into_iter()
        .map(|iface| iface.ip)
        .find(|ip| !ip.is_empty())
        .unwrap_or_default())
}

fn first_external_ip(interfaces: &[NetworkInterface]) -> String {
    interfaces
        .iter()
        .flat_map(|iface| iface.access_configs.iter())
        .map(|config| config.external_ip.as_str())
        .find(|ip| !ip.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub async fn fetch_instance_id(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_metadata(client, "instance/id").await
}

/// A non-empty zone means we are on GCP.
pub async fn detect(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_availability_zone(client).await
}
