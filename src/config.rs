//! Configuration types for rageshake

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for [`BugReporter`](crate::BugReporter)
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Endpoint bug reports are POSTed to (None = remote submission disabled)
    #[serde(default)]
    pub bug_report_endpoint: Option<String>,

    /// Product identifier sent as the `app` field (default: "riot-web")
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Timeout for the submit request (default: 5 minutes)
    #[serde(default = "default_submit_timeout", with = "duration_serde")]
    pub submit_timeout: Duration,

    /// File name of the locally downloaded archive (default: "rageshake.tar")
    #[serde(default = "default_archive_file_name")]
    pub archive_file_name: String,

    /// What to do when the archive file already exists in the download directory
    #[serde(default)]
    pub download_collision: FileCollisionAction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bug_report_endpoint: None,
            app_name: default_app_name(),
            submit_timeout: default_submit_timeout(),
            archive_file_name: default_archive_file_name(),
            download_collision: FileCollisionAction::default(),
        }
    }
}

impl Config {
    /// Parse a config from JSON, filling absent fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if self.submit_timeout.is_zero() {
            return Err(Error::Config {
                message: "submit timeout must be greater than zero".to_string(),
                key: Some("submit_timeout".to_string()),
            });
        }
        if self.archive_file_name.trim().is_empty() {
            return Err(Error::Config {
                message: "archive file name must not be empty".to_string(),
                key: Some("archive_file_name".to_string()),
            });
        }
        Ok(())
    }
}

/// File collision handling when saving the archive to disk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to the file name
    #[default]
    Rename,
    /// Replace the existing file
    Overwrite,
    /// Refuse to write
    Skip,
}

fn default_app_name() -> String {
    "riot-web".to_string()
}

fn default_submit_timeout() -> Duration {
    Duration::from_secs(5 * 60) // 5 minutes
}

fn default_archive_file_name() -> String {
    "rageshake.tar".to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
