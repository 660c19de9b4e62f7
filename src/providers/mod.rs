//! Built-in metadata clients and the [`Detector`] they back.

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod nscale;

use async_trait::async_trait;

use crate::client::MetadataClient;
use crate::detector::Detector;
use crate::error::MetadataError;
use crate::provider::CloudProvider;

/// Treat a 404 on an optional attribute as "not set on this instance".
pub(crate) fn absent_if_not_found(
    result: Result<String, MetadataError>,
) -> Result<String, MetadataError> {
    match result {
        Err(err) if err.is_not_found() => Ok(String::new()),
        other => other,
    }
}

/// A [`Detector`] for one of the built-in provider families.
#[derive(Debug, Clone)]
pub struct CloudDetector {
    provider: CloudProvider,
    client: MetadataClient,
}

impl CloudDetector {
    /// Create a detector talking to the provider's well-known endpoint.
    pub fn new(provider: CloudProvider) -> Result<Self, MetadataError> {
        Self::with_base_url(provider, provider.default_base_url())
    }

    /// Create a detector with a custom base URL (for testing).
    pub fn with_base_url(provider: CloudProvider, base_url: &str) -> Result<Self, MetadataError> {
        Ok(Self::with_client(
            provider,
            MetadataClient::with_base_url(base_url)?,
        ))
    }

    pub fn with_client(provider: CloudProvider, client: MetadataClient) -> Self {
        Self { provider, client }
    }

    pub fn cloud_provider(&self) -> CloudProvider {
        self.provider
    }

    /// Run the raw identity probe. A non-empty value means "present".
    async fn probe(&self) -> Result<String, MetadataError> {
        match self.provider {
            CloudProvider::Aws => aws::detect(&self.client).await,
            CloudProvider::Gcp => gcp::detect(&self.client).await,
            CloudProvider::Azure => azure::detect(&self.client).await,
            CloudProvider::Nscale => nscale::detect(&self.client).await,
        }
    }
}

#[async_trait]
impl Detector for CloudDetector {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn provider(&self) -> Result<String, MetadataError> {
        let found = self.probe().await?;
        if found.is_empty() {
            Ok(String::new())
        } else {
            Ok(self.provider.name().to_string())
        }
    }

    async fn public_ipv4(&self) -> Result<String, MetadataError> {
        match self.provider {
            CloudProvider::Aws => aws::fetch_public_ipv4(&self.client).await,
            CloudProvider::Gcp => gcp::fetch_public_ipv4(&self.client).await,
            CloudProvider::Azure => azure::fetch_public_ipv4(&self.client).await,
            CloudProvider::Nscale => nscale::fetch_public_ipv4(&self.client).await,
        }
    }

    async fn private_ipv4(&self) -> Result<String, MetadataError> {
        match self.provider {
            CloudProvider::Aws => aws::fetch_local_ipv4(&self.client).await,
            CloudProvider::Gcp => gcp::fetch_private_ipv4(&self.client).await,
            CloudProvider::Azure => azure::fetch_private_ipv4(&self.client).await,
            CloudProvider::Nscale => nscale::fetch_private_ipv4(&self.client).await,
        }
    }

    async fn vm_environment(&self) -> Result<String, MetadataError> {
        match self.provider {
            CloudProvider::Aws => aws::fetch_availability_zone(&self.client).await,
            CloudProvider::Gcp => gcp::fetch_availability_zone(&self.client).await,
            CloudProvider::Azure => azure::fetch_az_environment(&self.client).await,
            CloudProvider::Nscale => nscale::fetch_availability_zone(&self.client).await,
        }
    }

    async fn instance_id(&self) -> Result<String, MetadataError> {
        match self.provider {
            CloudProvider::Aws => aws::fetch_instance_id(&self.client).await,
            CloudProvider::Gcp => gcp::fetch_instance_id(&self.client).await,
            CloudProvider::Azure => azure::fetch_instance_id(&self.client).await,
            CloudProvider::Nscale => nscale::fetch_instance_id(&self.client).await,
        }
    }

    async fn region(&self) -> Result<String, MetadataError> {
        match self.provider {
            CloudProvider::Aws => aws::fetch_region(&self.client).await,
            CloudProvider::Gcp => {
                let zone = gcp::fetch_availability_zone(&self.client).await?;
                Ok(gcp::region_from_zone(&zone))
            }
            CloudProvider::Azure => azure::fetch_location(&self.client).await,
            CloudProvider::Nscale => nscale::fetch_region(&self.client).await,
        }
    }
}

/// Detectors for every built-in provider, in priority order.
pub fn default_detectors() -> Result<Vec<Box<dyn Detector>>, MetadataError> {
    CloudProvider::ALL
        .into_iter()
        .map(|provider| -> Result<Box<dyn Detector>, MetadataError> {
            Ok(Box::new(CloudDetector::new(provider)?))
        })
        .collect()
}
