//! The capability set every provider exposes, and a function-backed adapter.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::error::MetadataError;

/// A cloud provider's metadata client, as seen by the detection loop.
///
/// Every getter returns `Ok(String::new())` when the attribute is absent
/// on this instance and an error only for transport, protocol or decode
/// failures. The default bodies describe a provider that does not know
/// the attribute at all, which callers cannot tell apart from "absent".
#[async_trait]
pub trait Detector: Send + Sync {
    /// Canonical provider name, e.g. `"aws"`.
    fn name(&self) -> &str;

    /// Probe whether this provider hosts the current machine.
    ///
    /// Returns [`Detector::name`] on a match and an empty string otherwise.
    async fn provider(&self) -> Result<String, MetadataError>;

    async fn public_ipv4(&self) -> Result<String, MetadataError> {
        Ok(String::new())
    }

    async fn private_ipv4(&self) -> Result<String, MetadataError> {
        Ok(String::new())
    }

    /// Availability-zone-like placement of the instance.
    async fn vm_environment(&self) -> Result<String, MetadataError> {
        Ok(String::new())
    }

    async fn instance_id(&self) -> Result<String, MetadataError> {
        Ok(String::new())
    }

    async fn region(&self) -> Result<String, MetadataError> {
        Ok(String::new())
    }
}

/// A boxed attribute lookup used by [`FnDetector`].
pub type LookupFn =
    Arc<dyn Fn() -> BoxFuture<'static, Result<String, MetadataError>> + Send + Sync>;

fn boxed<F, Fut>(f: F) -> LookupFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

async fn lookup(slot: &Option<LookupFn>) -> Result<String, MetadataError> {
    match slot {
        Some(f) => f().await,
        None => Ok(String::new()),
    }
}

/// A [`Detector`] assembled from individual lookup functions.
///
/// Any lookup left unset answers `Ok("")`.
///
/// ```ignore
/// let detector = FnDetector::new("azure")
///     .with_provider(|| async { Ok("eastus".to_string()) })
///     .with_public_ipv4(|| async { Ok("5.6.7.8".to_string()) });
/// ```
#[derive(Clone)]
pub struct FnDetector {
    name: String,
    provider: Option<LookupFn>,
    public_ipv4: Option<LookupFn>,
    private_ipv4: Option<LookupFn>,
    vm_environment: Option<LookupFn>,
    instance_id: Option<LookupFn>,
    region: Option<LookupFn>,
}

impl FnDetector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
            public_ipv4: None,
            private_ipv4: None,
            vm_environment: None,
            instance_id: None,
            region: None,
        }
    }

    /// Set the identity probe. Any non-empty value it yields counts as a match.
    pub fn with_provider<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
    {
        self.provider = Some(boxed(f));
        self
    }

    pub fn with_public_ipv4<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
    {
        self.public_ipv4 = Some(boxed(f));
        self
    }

    pub fn with_private_ipv4<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
    {
        self.private_ipv4 = Some(boxed(f));
        self
    }

    pub fn with_vm_environment<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
    {
        self.vm_environment = Some(boxed(f));
        self
    }

    pub fn with_instance_id<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
    {
        self.instance_id = Some(boxed(f));
        self
    }

    pub fn with_region<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, MetadataError>> + Send + 'static,
    {
        self.region = Some(boxed(f));
        self
    }
}

impl fmt::Debug for FnDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDetector")
            .field("name", &self.name)
            .field("provider", &self.provider.is_some())
            .field("public_ipv4", &self.public_ipv4.is_some())
            .field("private_ipv4", &self.private_ipv4.is_some())
            .field("vm_environment", &self.vm_environment.is_some())
            .field("instance_id", &self.instance_id.is_some())
            .field("region", &self.region.is_some())
            .finish()
    }
}

#[async_trait]
impl Detector for FnDetector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn provider(&self) -> Result<String, MetadataError> {
        let found = lookup(&self.provider).await?;
        if found.is_empty() {
            Ok(String::new())
        } else {
            Ok(self.name.clone())
        }
    }

    async fn public_ipv4(&self) -> Result<String, MetadataError> {
        lookup(&self.public_ipv4).await
    }

    async fn private_ipv4(&self) -> Result<String, MetadataError> {
        lookup(&self.private_ipv4).await
    }

    async fn vm_environment(&self) -> Result<String, MetadataError> {
        lookup(&self.vm_environment).await
    }

    async fn instance_id(&self) -> Result<String, MetadataError> {
        lookup(&self.instance_id).await
    }

    async fn region(&self) -> Result<String, MetadataError> {
        lookup(&self.region).await
    }
}
