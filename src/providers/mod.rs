//! Collaborators the report builder reads from
//!
//! The builder never reaches for global state. Everything it records comes
//! from one of the traits in this module, passed in through [`Collaborators`]:
//!
//! - [`VersionProvider`]: application version
//! - [`EnvironmentProbe`]: user agent, display mode, pointer type, storage
//! - [`IdentityProvider`]: signed-in user, device and its keys
//! - [`FeatureFlagSource`]: labs features and whether they are enabled
//! - [`LogSource`]: log segments to attach
//!
//! Simple implementations are provided for hosts that have nothing better:
//!
//! - [`NoOpEnvironment`]: every probe degrades (`UNKNOWN` or omitted)
//! - [`StaticVersion`], [`StaticFeatureFlags`], [`DeviceIdentity`]: fixed values
//! - [`DirectoryLogSource`]: reads `*.log` files from a directory
//!
//! ## Usage
//!
//! ```no_run
//! use rageshake::providers::{Collaborators, DirectoryLogSource, StaticVersion};
//! use std::sync::Arc;
//!
//! let collaborators = Collaborators::new(
//!     Arc::new(StaticVersion::new("1.11.0")),
//!     Arc::new(DirectoryLogSource::new("/var/log/riot")),
//! );
//! ```

mod directory;
mod noop;
mod traits;

pub use directory::DirectoryLogSource;
pub use noop::{DeviceIdentity, NoOpEnvironment, StaticFeatureFlags, StaticVersion};
pub use traits::{
    EnvironmentProbe, FeatureFlagSource, IdentityProvider, LogSource, VersionProvider,
};

use std::sync::Arc;

/// Everything the report builder needs from the host application
#[derive(Clone)]
pub struct Collaborators {
    /// Application version lookup
    pub version: Arc<dyn VersionProvider>,
    /// Source of log segments
    pub logs: Arc<dyn LogSource>,
    /// Labs feature flags
    pub features: Arc<dyn FeatureFlagSource>,
    /// Signed-in identity (None when logged out)
    pub identity: Option<Arc<dyn IdentityProvider>>,
    /// Host environment probes
    pub environment: Arc<dyn EnvironmentProbe>,
}

impl Collaborators {
    /// Collaborators with no identity, no enabled features and a degraded environment
    pub fn new(version: Arc<dyn VersionProvider>, logs: Arc<dyn LogSource>) -> Self {
        Self {
            version,
            logs,
            features: Arc::new(StaticFeatureFlags::default()),
            identity: None,
            environment: Arc::new(NoOpEnvironment),
        }
    }

    /// Replace the feature flag source
    pub fn with_features(mut self, features: Arc<dyn FeatureFlagSource>) -> Self {
        self.features = features;
        self
    }

    /// Set the signed-in identity
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Replace the environment probe
    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentProbe>) -> Self {
        self.environment = environment;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("logs", &self.logs.name())
            .field("has_identity", &self.identity.is_some())
            .finish_non_exhaustive()
    }
}
