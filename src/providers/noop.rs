//! Fixed-value and degraded collaborator implementations

use super::traits::{EnvironmentProbe, FeatureFlagSource, IdentityProvider, VersionProvider};
use crate::types::StorageEstimate;
use async_trait::async_trait;

/// Environment probe for hosts that cannot answer any probe
///
/// The user agent is absent and every other probe returns
/// `Error::NotSupported`, so the report records `UNKNOWN` for display mode and
/// touch input and omits storage information.
///
/// # Examples
///
/// ```
/// use rageshake::providers::{EnvironmentProbe, NoOpEnvironment};
///
/// let probe = NoOpEnvironment;
/// assert!(probe.user_agent().is_none());
/// assert!(probe.has_touch_input().is_err());
/// ```
pub struct NoOpEnvironment;

#[async_trait]
impl EnvironmentProbe for NoOpEnvironment {
    fn user_agent(&self) -> Option<String> {
        None
    }

    fn is_standalone_display(&self) -> crate::Result<bool> {
        Err(crate::Error::NotSupported("display mode detection".into()))
    }

    fn has_touch_input(&self) -> crate::Result<bool> {
        Err(crate::Error::NotSupported("pointer detection".into()))
    }

    async fn storage_persisted(&self) -> crate::Result<bool> {
        Err(crate::Error::NotSupported("storage persistence".into()))
    }

    async fn storage_estimate(&self) -> crate::Result<StorageEstimate> {
        Err(crate::Error::NotSupported("storage estimate".into()))
    }
}

/// Version provider returning a fixed string
#[derive(Clone, Debug)]
pub struct StaticVersion(String);

impl StaticVersion {
    /// Create a provider for `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// This crate's own version
    pub fn crate_version() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl VersionProvider for StaticVersion {
    async fn app_version(&self) -> crate::Result<String> {
        Ok(self.0.clone())
    }
}

/// Feature flags held in memory
///
/// `known` lists every labs feature, `enabled` the subset switched on.
#[derive(Clone, Debug, Default)]
pub struct StaticFeatureFlags {
    known: Vec<String>,
    enabled: Vec<String>,
}

impl StaticFeatureFlags {
    /// Flags where every known feature is enabled
    pub fn all_enabled<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known: Vec<String> = features.into_iter().map(Into::into).collect();
        Self {
            enabled: known.clone(),
            known,
        }
    }

    /// Add a known feature and whether it is enabled
    pub fn with_feature(mut self, feature: impl Into<String>, enabled: bool) -> Self {
        let feature = feature.into();
        if enabled {
            self.enabled.push(feature.clone());
        }
        self.known.push(feature);
        self
    }
}

impl FeatureFlagSource for StaticFeatureFlags {
    fn labs_features(&self) -> Vec<String> {
        self.known.clone()
    }

    fn is_feature_enabled(&self, feature: &str) -> bool {
        self.enabled.iter().any(|f| f == feature)
    }
}

/// Identity with fixed values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Fully qualified user ID
    pub user_id: String,
    /// Device ID
    pub device_id: String,
    /// ed25519 signing key
    pub ed25519_key: String,
    /// curve25519 identity key
    pub curve25519_key: Option<String>,
    /// Cross-signing master key ID
    pub cross_signing_key: Option<String>,
}

impl IdentityProvider for DeviceIdentity {
    fn user_id(&self) -> String {
        self.user_id.clone()
    }

    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn device_ed25519_key(&self) -> String {
        self.ed25519_key.clone()
    }

    fn device_curve25519_key(&self) -> Option<String> {
        self.curve25519_key.clone()
    }

    fn cross_signing_id(&self) -> Option<String> {
        self.cross_signing_key.clone()
    }
}
