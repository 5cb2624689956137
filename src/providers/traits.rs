//! Collaborator traits for report building

use crate::types::{LogSegment, StorageEstimate};
use async_trait::async_trait;

/// Looks up the running application's version
#[async_trait]
pub trait VersionProvider: Send + Sync {
    /// Version string of the application
    ///
    /// # Errors
    ///
    /// Any error is recorded as `UNKNOWN` by the builder.
    async fn app_version(&self) -> crate::Result<String>;
}

/// Supplies the log segments attached to a report
///
/// The result is a finite list; each segment is compressed independently.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Log segments to attach, in the order they should appear
    ///
    /// # Errors
    ///
    /// Errors abort the report: a report with silently missing logs is
    /// worse than no report.
    async fn logs_for_report(&self) -> crate::Result<Vec<LogSegment>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Labs feature flags
pub trait FeatureFlagSource: Send + Sync {
    /// All labs features known to the client
    fn labs_features(&self) -> Vec<String>;

    /// Whether the given feature is enabled
    fn is_feature_enabled(&self, feature: &str) -> bool;
}

/// The signed-in user and their device
pub trait IdentityProvider: Send + Sync {
    /// Fully qualified user ID, e.g. `@alice:example.org`
    fn user_id(&self) -> String;

    /// Device ID of this session
    fn device_id(&self) -> String;

    /// Device ed25519 signing key
    fn device_ed25519_key(&self) -> String;

    /// Device curve25519 identity key, when the crypto backend exposes it
    fn device_curve25519_key(&self) -> Option<String> {
        None
    }

    /// Cross-signing master key ID, when cross-signing is set up
    fn cross_signing_id(&self) -> Option<String> {
        None
    }
}

/// Probes of the host environment
///
/// Every probe is best effort. Synchronous probes that fail are recorded as
/// `UNKNOWN`; storage probes that fail are left out of the report.
#[async_trait]
pub trait EnvironmentProbe: Send + Sync {
    /// User agent string, if the host has one
    fn user_agent(&self) -> Option<String>;

    /// Whether the client runs as an installed standalone app
    fn is_standalone_display(&self) -> crate::Result<bool>;

    /// Whether the primary pointer is coarse (touch input)
    fn has_touch_input(&self) -> crate::Result<bool>;

    /// Whether client storage is marked persistent
    async fn storage_persisted(&self) -> crate::Result<bool>;

    /// Storage quota and usage
    async fn storage_estimate(&self) -> crate::Result<StorageEstimate>;
}
