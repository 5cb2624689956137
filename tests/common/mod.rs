//! Common test utilities for rageshake integration tests

use async_trait::async_trait;
use rageshake::providers::{
    Collaborators, DeviceIdentity, EnvironmentProbe, LogSource, StaticFeatureFlags, StaticVersion,
};
use rageshake::{LogSegment, ReportEvent, StorageEstimate};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Log source returning a fixed list of segments
pub struct FixedLogs(pub Vec<LogSegment>);

#[async_trait]
impl LogSource for FixedLogs {
    async fn logs_for_report(&self) -> rageshake::Result<Vec<LogSegment>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Environment that answers every probe
pub struct DesktopBrowser;

#[async_trait]
impl EnvironmentProbe for DesktopBrowser {
    fn user_agent(&self) -> Option<String> {
        Some("Mozilla/5.0 (X11; Linux x86_64; rv:68.0) Gecko/20100101 Firefox/68.0".into())
    }

    fn is_standalone_display(&self) -> rageshake::Result<bool> {
        Ok(false)
    }

    fn has_touch_input(&self) -> rageshake::Result<bool> {
        Ok(false)
    }

    async fn storage_persisted(&self) -> rageshake::Result<bool> {
        Ok(false)
    }

    async fn storage_estimate(&self) -> rageshake::Result<StorageEstimate> {
        Ok(StorageEstimate {
            quota: 2_000_000,
            usage: 1_500,
            usage_details: vec![("indexedDB".into(), 1_500)],
        })
    }
}

/// The "a"/"b" segments with "hello"/"world"
pub fn hello_world_logs() -> Vec<LogSegment> {
    vec![LogSegment::new("a", "hello"), LogSegment::new("b", "world")]
}

/// Fully populated collaborators for a signed-in desktop session
pub fn signed_in_collaborators(logs: Vec<LogSegment>) -> Collaborators {
    Collaborators::new(
        Arc::new(StaticVersion::new("1.6.0")),
        Arc::new(FixedLogs(logs)),
    )
    .with_identity(Arc::new(DeviceIdentity {
        user_id: "@alice:example.org".into(),
        device_id: "JLAFKJWSCS".into(),
        ed25519_key: "nE6W2fCblxDcOFmeEtCHNl8/l8bXcu7GKyAswA4r3mM".into(),
        curve25519_key: Some("3MbKgLPXRuw7nMO4rGP8gHmfSB6G0JhGZ8YSAvNG4FE".into()),
        cross_signing_key: Some("ZcrEFo3CQ1cAzULkhHnjkOrL/x7gYCm8HZfG7E0FNfY".into()),
    }))
    .with_features(Arc::new(
        StaticFeatureFlags::default().with_feature("feature_pinning", true),
    ))
    .with_environment(Arc::new(DesktopBrowser))
}

/// Collect every event currently buffered on `rx`
pub fn drain_events(rx: &mut broadcast::Receiver<ReportEvent>) -> Vec<ReportEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
