//! Report building: environment metadata plus compressed logs
//!
//! Metadata probes degrade instead of failing: a version lookup, display-mode
//! or pointer probe that errors is recorded as `UNKNOWN`, and storage probes
//! that error are left out. Log collection and compression are the exception;
//! their errors abort the build.

use crate::compression::gzip;
use crate::error::{Error, Result};
use crate::providers::Collaborators;
use crate::types::{
    BugReportOptions, COMPRESSED_LOG_FIELD, DEFAULT_USER_TEXT, Report, UNKNOWN, progress,
};
use tracing::{debug, info};

/// Assembles a [`Report`] from the injected collaborators
#[derive(Clone, Debug)]
pub struct ReportBuilder {
    app_name: String,
    collaborators: Collaborators,
}

impl ReportBuilder {
    /// Create a builder that tags reports with `app_name`
    pub fn new(app_name: impl Into<String>, collaborators: Collaborators) -> Self {
        Self {
            app_name: app_name.into(),
            collaborators,
        }
    }

    /// Build a fresh report for `options`
    ///
    /// # Errors
    ///
    /// Only log collection can fail the build: a log source error, or a
    /// segment that cannot be compressed.
    pub async fn build(&self, options: &BugReportOptions) -> Result<Report> {
        options.report_progress(progress::COLLECTING_VERSION);
        let version = match self.collaborators.version.app_version().await {
            Ok(version) => version,
            Err(e) => {
                debug!(error = %e, "app version unavailable");
                UNKNOWN.to_string()
            }
        };

        let env = &self.collaborators.environment;
        let user_agent = env.user_agent().unwrap_or_else(|| UNKNOWN.to_string());
        let installed_pwa = probe_flag("installed_pwa", env.is_standalone_display());
        let touch_input = probe_flag("touch_input", env.has_touch_input());

        info!("sending bug report");

        let mut report = Report::new();
        let text = if options.user_text.is_empty() {
            DEFAULT_USER_TEXT
        } else {
            options.user_text.as_str()
        };
        report.push_text("text", text);
        report.push_text("app", self.app_name.as_str());
        report.push_text("version", version);
        report.push_text("user_agent", user_agent);
        report.push_text("installed_pwa", installed_pwa);
        report.push_text("touch_input", touch_input);

        if let Some(identity) = &self.collaborators.identity {
            report.push_text("user_id", identity.user_id());
            report.push_text("device_id", identity.device_id());

            let mut keys = vec![format!("ed25519:{}", identity.device_ed25519_key())];
            if let Some(curve) = identity.device_curve25519_key() {
                keys.push(format!("curve25519:{}", curve));
            }
            report.push_text("device_keys", keys.join(", "));

            if let Some(cross_signing) = identity.cross_signing_id() {
                report.push_text("cross_signing_key", cross_signing);
            }
        }

        if let Some(label) = options.label.as_deref().filter(|l| !l.is_empty()) {
            report.push_text("label", label);
        }

        let features = &self.collaborators.features;
        let enabled_labs: Vec<String> = features
            .labs_features()
            .into_iter()
            .filter(|f| features.is_feature_enabled(f))
            .collect();
        if !enabled_labs.is_empty() {
            report.push_text("enabled_labs", enabled_labs.join(", "));
        }

        match env.storage_persisted().await {
            Ok(persisted) => report.push_text("storageManager_persisted", persisted.to_string()),
            Err(e) => debug!(error = %e, "storage persistence unavailable"),
        }

        match env.storage_estimate().await {
            Ok(estimate) => {
                report.push_text("storageManager_quota", estimate.quota.to_string());
                report.push_text("storageManager_usage", estimate.usage.to_string());
                for (category, usage) in estimate.usage_details {
                    report.push_text(
                        format!("storageManager_usage_{}", category),
                        usage.to_string(),
                    );
                }
            }
            Err(e) => debug!(error = %e, "storage estimate unavailable"),
        }

        if options.send_logs {
            options.report_progress(progress::COLLECTING_LOGS);
            let logs = self.collaborators.logs.logs_for_report().await?;
            debug!(
                source = self.collaborators.logs.name(),
                segments = logs.len(),
                "compressing logs"
            );
            for entry in logs {
                let compressed = gzip(entry.lines.as_bytes()).map_err(Error::Compression)?;
                report.push_blob(COMPRESSED_LOG_FIELD, entry.id, compressed);
            }
        }

        Ok(report)
    }
}

fn probe_flag(name: &str, result: Result<bool>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => {
            debug!(probe = name, error = %e, "environment probe failed");
            UNKNOWN.to_string()
        }
    }
}
