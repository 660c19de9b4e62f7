//! Azure IMDS implementation.

use serde::Deserialize;

use crate::client::{read_json, send, MetadataClient, METADATA};
use crate::error::MetadataError;

/// Azure compute document path.
const COMPUTE_PATH: &str = "/metadata/instance/compute";

/// Azure network interface list path.
const INTERFACES_PATH: &str = "/metadata/instance/network/interface";

/// API version query parameter.
const API_VERSION: &str = "2021-02-01";

/// Required header for Azure metadata requests.
const METADATA_HEADER: &str = "Metadata";

/// Required header value for Azure metadata requests.
const METADATA_VALUE: &str = "true";

/// Subset of the `instance/compute` document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compute {
    #[serde(default, rename = "azEnvironment")]
    pub az_environment: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub vm_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub ipv4: Ipv4Info,
    #[serde(default)]
    pub mac_address: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipv4Info {
    #[serde(default)]
    pub ip_address: Vec<Ipv4Address>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipv4Address {
    #[serde(default)]
    pub private_ip_address: String,
    #[serde(default)]
    pub public_ip_address: String,
}

pub async fn fetch_compute(client: &MetadataClient) -> Result<Compute, MetadataError> {
    let request = client
        .inner()
        .get(client.url(COMPUTE_PATH))
        .query(&[("api-version", API_VERSION)])
        .header(METADATA_HEADER, METADATA_VALUE);

    let response = send(request, METADATA).await?;
    read_json(response, "compute").await
}

pub async fn fetch_network_interfaces(
    client: &MetadataClient,
) -> Result<Vec<NetworkInterface>, MetadataError> {
    let request = client
        .inner()
        .get(client.url(INTERFACES_PATH))
        .query(&[("api-version", API_VERSION), ("format", "json")])
        .header(METADATA_HEADER, METADATA_VALUE);

    let response = send(request, METADATA).await?;
    read_json(response, "network interface").await
}

fn first_address<F>(interfaces: &[NetworkInterface], pick: F) -> String
where
    F: Fn(&Ipv4Address) -> &str,
{
    interfaces
        .iter()
        .flat_map(|iface| iface.ipv4.ip_address.iter())
        .map(pick)
        .find(|ip| !ip.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub async fn fetch_public_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    let interfaces = fetch_network_interfaces(client).await?;
    Ok(first_address(&interfaces, |addr| addr.public_ip_address.as_str()))
}

pub async fn fetch_private_ipv4(client: &MetadataClient) -> Result<String, MetadataError> {
    let interfaces = fetch_network_interfaces(client).await?;
    Ok(first_address(&interfaces, |addr| addr.private_ip_address.as_str()))
}

pub async fn fetch_location(client: &MetadataClient) -> Result<String, MetadataError> {
    Ok(fetch_compute(client).await?.location)
}

/// The Azure cloud the VM runs in, e.g. `AzurePublicCloud`.
pub async fn fetch_az_environment(client: &MetadataClient) -> Result<String, MetadataError> {
    Ok(fetch_compute(client).await?.az_environment)
}

pub async fn fetch_instance_id(client: &MetadataClient) -> Result<String, MetadataError> {
    Ok(fetch_compute(client).await?.vm_id)
}

/// A non-empty location means we are on Azure.
pub async fn detect(client: &MetadataClient) -> Result<String, MetadataError> {
    fetch_location(client).await
}
