//! Detect which cloud provider hosts the current machine.
//!
//! Each supported provider is asked, through its link-local instance
//! metadata service, whether it runs this machine. Providers are tried one
//! at a time in a fixed order; the first one that claims the machine is
//! then queried for a few descriptive attributes.
//!
//! # Features
//!
//! - AWS IMDSv2 (token-gated), GCP metadata server, Azure IMDS and nscale
//!   (OpenStack) metadata
//! - Per-probe deadline so one unresponsive endpoint cannot stall detection
//! - Custom providers through the [`Detector`] trait or [`FnDetector`]
//!
//! # Example
//!
//! ```ignore
//! use cloud_detect::{default_detectors, detect, MetadataError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MetadataError> {
//!     let detectors = default_detectors()?;
//!     let info = detect(&detectors).await?;
//!
//!     println!("provider: {}", info.provider);
//!     println!("public ip: {}", info.public_ip);
//!     Ok(())
//! }
//! ```
//!
//! # Provider-Specific Behavior
//!
//! | Provider | Identity probe | VM environment |
//! |----------|----------------|----------------|
//! | AWS | `placement/availability-zone` is non-empty | availability zone |
//! | GCP | `instance/zone` is non-empty | zone |
//! | Azure | compute `location` is non-empty | compute `azEnvironment` |
//! | nscale | `meta_data.json` has uuid, organization and project | availability zone |

mod client;
mod detect;
mod detector;
mod error;
mod provider;
pub mod providers;

pub use client::{MetadataClient, DEFAULT_TIMEOUT, GCP_BASE_URL, LINK_LOCAL_BASE_URL};
pub use detect::{detect, Detection, Info, DEFAULT_PROBE_TIMEOUT, UNKNOWN_PROVIDER};
pub use detector::{Detector, FnDetector, LookupFn};
pub use error::MetadataError;
pub use provider::CloudProvider;
pub use providers::{default_detectors, CloudDetector};
