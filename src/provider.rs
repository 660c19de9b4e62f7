//! Cloud provider enumeration.

use std::fmt;
use std::str::FromStr;

use crate::client::{GCP_BASE_URL, LINK_LOCAL_BASE_URL};

/// Cloud provider families with a built-in metadata client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudProvider {
    /// Amazon Web Services
    Aws,
    /// Google Cloud Platform
    Gcp,
    /// Microsoft Azure
    Azure,
    /// nscale (OpenStack based)
    Nscale,
}

impl CloudProvider {
    /// All known providers in detection priority order.
    pub const ALL: [CloudProvider; 4] = [
        CloudProvider::Aws,
        CloudProvider::Gcp,
        CloudProvider::Azure,
        CloudProvider::Nscale,
    ];

    /// Canonical name reported in detection results.
    pub fn name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Azure => "azure",
            CloudProvider::Nscale => "nscale",
        }
    }

    /// Where this provider serves its metadata.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            CloudProvider::Gcp => GCP_BASE_URL,
            CloudProvider::Aws | CloudProvider::Azure | CloudProvider::Nscale => {
                LINK_LOCAL_BASE_URL
            }
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CloudProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(CloudProvider::Aws),
            "gcp" => Ok(CloudProvider::Gcp),
            "azure" => Ok(CloudProvider::Azure),
            "nscale" => Ok(CloudProvider::Nscale),
            _ => Err(format!(
                "unknown provider: {} (expected aws, gcp, azure, or nscale)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_display() {
        assert_eq!(CloudProvider::Aws.to_string(), "aws");
        assert_eq!(CloudProvider::Gcp.to_string(), "gcp");
        assert_eq!(CloudProvider::Azure.to_string(), "azure");
        assert_eq!(CloudProvider::Nscale.to_string(), "nscale");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("AWS".parse::<CloudProvider>(), Ok(CloudProvider::Aws));
        assert_eq!("nscale".parse::<CloudProvider>(), Ok(CloudProvider::Nscale));
        assert!("oracle".parse::<CloudProvider>().is_err());
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(CloudProvider::ALL[0], CloudProvider::Aws);
        assert_eq!(CloudProvider::ALL[3], CloudProvider::Nscale);
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(
            CloudProvider::Gcp.default_base_url(),
            "http://metadata.google.internal"
        );
        assert_eq!(
            CloudProvider::Nscale.default_base_url(),
            "http://169.254.169.254"
        );
    }
}
