//! Provider detection: probe each candidate in order, then describe the winner.

use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::detector::Detector;
use crate::error::MetadataError;

/// Deadline for one provider's identity probe, including multi-step
/// handshakes such as the AWS token exchange.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Provider name reported when no candidate matched.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// What is known about the machine's hosting provider.
///
/// Empty fields mean "not determined".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Info {
    pub provider: String,
    pub public_ip: String,
    pub private_ip: String,
    pub vm_environment: String,
    pub instance_id: String,
    pub region: String,
}

impl Info {
    /// The result for a machine no candidate claimed.
    pub fn unknown() -> Self {
        Self {
            provider: UNKNOWN_PROVIDER.to_string(),
            ..Self::default()
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.provider == UNKNOWN_PROVIDER
    }
}

/// Detection settings.
///
/// # Example
///
/// ```ignore
/// use cloud_detect::{default_detectors, Detection};
///
/// let detectors = default_detectors()?;
/// let info = Detection::new()
///     .with_probe_timeout(Duration::from_secs(5))
///     .run(&detectors)
///     .await?;
/// println!("{}", info.provider);
/// ```
#[derive(Debug, Clone)]
pub struct Detection {
    probe_timeout: Duration,
}

impl Default for Detection {
    fn default() -> Self {
        Self::new()
    }
}

impl Detection {
    pub fn new() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Bound each identity probe by `timeout`.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Probe `detectors` one at a time in order and describe the first match.
    ///
    /// A probe that fails or times out only rules its provider out. Once a
    /// provider matched, every enrichment lookup must succeed; the first
    /// failure aborts detection. No match at all yields [`Info::unknown`].
    ///
    /// Dropping the returned future cancels any request in flight.
    pub async fn run<D>(&self, detectors: &[D]) -> Result<Info, MetadataError>
    where
        D: AsRef<dyn Detector>,
    {
        for detector in detectors {
            let detector = detector.as_ref();
            debug!("probing {}", detector.name());

            let provider = match self.identify(detector).await {
                Ok(provider) => provider,
                Err(e) => {
                    debug!("{} not detected: {}", detector.name(), e);
                    continue;
                }
            };

            if provider.is_empty() {
                debug!("{} not detected", detector.name());
                continue;
            }

            info!("detected cloud provider {}", provider);
            return enrich(detector, provider).await;
        }

        debug!("no cloud provider detected");
        Ok(Info::unknown())
    }

    /// Ask `detector` for its provider name within the deadline.
    async fn identify(&self, detector: &dyn Detector) -> Result<String, MetadataError> {
        tokio::time::timeout(self.probe_timeout, detector.provider())
            .await
            .unwrap_or(Err(MetadataError::Timeout(self.probe_timeout)))
    }
}

async fn enrich(detector: &dyn Detector, provider: String) -> Result<Info, MetadataError> {
    let public_ip = step("public IP", detector.public_ipv4().await)?;
    let private_ip = step("private IP", detector.private_ipv4().await)?;
    let vm_environment = step("VM environment", detector.vm_environment().await)?;
    let instance_id = step("instance ID", detector.instance_id().await)?;
    let region = step("region", detector.region().await)?;

    Ok(Info {
        provider,
        public_ip,
        private_ip,
        vm_environment,
        instance_id,
        region,
    })
}

fn step(
    step: &'static str,
    result: Result<String, MetadataError>,
) -> Result<String, MetadataError> {
    result.map_err(|source| MetadataError::Enrichment {
        step,
        source: Box::new(source),
    })
}

/// [`Detection::run`] with default settings.
pub async fn detect<D>(detectors: &[D]) -> Result<Info, MetadataError>
where
    D: AsRef<dyn Detector>,
{
    Detection::new().run(detectors).await
}
